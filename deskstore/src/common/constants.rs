// doc constants
pub const DOC_ID: &str = "id";
pub const FIELD_SEPARATOR: &str = ".";

// tenant constants
pub const TENANT_FIELD: &str = "user_id";

// dashboard collections
pub const CONTACTS: &str = "contacts";
pub const MESSAGES: &str = "messages";
pub const CAMPAIGNS: &str = "campaigns";
pub const TEMPLATES: &str = "templates";
pub const USERS: &str = "users";

// store constants
pub const DEFAULT_DATABASE_NAME: &str = "dashboard";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

// environment keys
pub const ENV_LIVE_URL: &str = "DESKSTORE_URL";
pub const ENV_DATABASE_NAME: &str = "DESKSTORE_DB_NAME";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "DESKSTORE_CONNECT_TIMEOUT_MS";
pub const ENV_SEED_FIXTURES: &str = "DESKSTORE_SEED_FIXTURES";

// query operators
pub const OP_EQ: &str = "$eq";
pub const OP_REGEX: &str = "$regex";
pub const OP_OPTIONS: &str = "$options";
pub const OP_IN: &str = "$in";
pub const OP_OR: &str = "$or";
pub const OP_AND: &str = "$and";

// update operators
pub const OP_SET: &str = "$set";
pub const OP_INC: &str = "$inc";
pub const OP_ADD_TO_SET: &str = "$addToSet";
pub const OP_EACH: &str = "$each";
