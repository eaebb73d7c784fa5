/// Direction of a cursor sort.
///
/// Document databases usually spell the direction as `1` / `-1`; the
/// `From<i32>` conversion accepts that form, treating any negative number as
/// descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first, missing fields before everything else
    #[default]
    Ascending,
    /// Largest first, missing fields last
    Descending,
}

impl SortOrder {
    /// The numeric form used in query documents.
    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl From<i32> for SortOrder {
    fn from(direction: i32) -> Self {
        if direction < 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}
