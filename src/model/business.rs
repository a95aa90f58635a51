/// Label used for staff without a business (or whose business was deleted)
pub const UNASSIGNED_BUSINESS: &str = "Unassigned";
