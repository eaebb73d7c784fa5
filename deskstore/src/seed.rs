//! Sample dashboard data for the embedded store.

use crate::collection::Document;
use crate::common::{Value, CAMPAIGNS, CONTACTS, MESSAGES, TEMPLATES};
use crate::doc;
use crate::errors::StoreResult;
use crate::store::StoreBackendProvider;
use chrono::{Duration, SecondsFormat, Utc};

const FIXTURE_OWNER: &str = "default_user";

fn ago(offset: Duration) -> String {
    (Utc::now() - offset).to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Sample documents per collection. Timestamps are relative to the call.
pub fn fixtures() -> Vec<(&'static str, Vec<Document>)> {
    vec![
        (CONTACTS, contacts()),
        (MESSAGES, messages()),
        (CAMPAIGNS, campaigns()),
        (TEMPLATES, templates()),
    ]
}

/// Inserts [fixtures] into `backend`.
pub fn seed_fixtures(backend: &dyn StoreBackendProvider) -> StoreResult<()> {
    for (name, documents) in fixtures() {
        let collection = backend.collection(name)?;
        let count = documents.len();
        for document in documents {
            collection.insert(document)?;
        }
        log::debug!("Seeded {} documents into {}", count, name);
    }
    Ok(())
}

fn contacts() -> Vec<Document> {
    vec![
        doc! {
            id: "1",
            user_id: FIXTURE_OWNER,
            name: "Sarah Johnson",
            phone: "+1 (555) 123-4567",
            email: "sarah.johnson@email.com",
            tags: ["VIP", "Customer"],
            status: "Active",
            lastMessage: "Thanks for the quick response!",
            lastMessageTime: (ago(Duration::hours(2))),
            avatar: "SJ",
            createdAt: (ago(Duration::days(45))),
        },
        doc! {
            id: "2",
            user_id: FIXTURE_OWNER,
            name: "Michael Chen",
            phone: "+1 (555) 234-5678",
            email: "michael.chen@email.com",
            tags: ["Lead", "Prospect"],
            status: "Active",
            lastMessage: "I'm interested in your premium plan",
            lastMessageTime: (ago(Duration::hours(5))),
            avatar: "MC",
            createdAt: (ago(Duration::days(30))),
        },
        doc! {
            id: "3",
            user_id: FIXTURE_OWNER,
            name: "Emily Davis",
            phone: "+1 (555) 345-6789",
            email: "emily.davis@email.com",
            tags: ["Customer", "Support"],
            status: "Inactive",
            lastMessage: "Got it, thank you!",
            lastMessageTime: (ago(Duration::days(1))),
            avatar: "ED",
            createdAt: (ago(Duration::days(60))),
        },
    ]
}

fn messages() -> Vec<Document> {
    let conversations: [(&str, &[&str]); 2] = [
        (
            "+1 (555) 123-4567",
            &["Hi!", "Hello Sarah!", "Interested in premium", "Great choice!", "Thanks!"],
        ),
        (
            "+1 (555) 234-5678",
            &["Question about services", "What would you like to know?", "Difference in plans?"],
        ),
    ];

    let mut messages = Vec::new();
    for (phone, texts) in conversations {
        for (i, text) in texts.iter().enumerate() {
            // alternate between the contact and the business, oldest first
            let id = (messages.len() + 1).to_string();
            messages.push(doc! {
                id: id,
                phoneNumber: phone,
                text: (*text),
                timestamp: (ago(Duration::hours(10 - i as i64))),
                sent: (i % 2 == 1),
                status: "read",
                user_id: FIXTURE_OWNER,
            });
        }
    }
    messages
}

fn campaigns() -> Vec<Document> {
    vec![
        doc! {
            id: "1",
            user_id: FIXTURE_OWNER,
            name: "Summer Sale 2024",
            status: "Active",
            description: "Promotional campaign",
            recipients: 2458,
            sent: 2458,
            delivered: 2385,
            read: 1917,
            readRate: "78%",
            deliveryRate: "97%",
            createdAt: "Mar 15, 2024",
            scheduledAt: (Value::Null),
        },
        doc! {
            id: "2",
            user_id: FIXTURE_OWNER,
            name: "Welcome Series",
            status: "Active",
            description: "Automated welcome messages",
            recipients: 1234,
            sent: 1234,
            delivered: 1197,
            read: 1012,
            readRate: "82%",
            deliveryRate: "97%",
            createdAt: "Mar 10, 2024",
            scheduledAt: (Value::Null),
        },
    ]
}

fn templates() -> Vec<Document> {
    vec![
        doc! {
            id: "1",
            name: "Welcome Message",
            category: "utility",
            status: "approved",
            language: "English",
            content: "Hello {{name}}! Welcome to our service.",
            parameters: ["name"],
            usageCount: 1234,
            createdAt: "Mar 1, 2024",
        },
        doc! {
            id: "2",
            name: "Order Confirmation",
            category: "transactional",
            status: "approved",
            language: "English",
            content: "Hi {{name}}! Your order #{{order_id}} confirmed.",
            parameters: ["name", "order_id"],
            usageCount: 856,
            createdAt: "Feb 15, 2024",
        },
    ]
}
