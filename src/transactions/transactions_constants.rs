/// Transaction type constants
pub const TRANSACTION_TYPE_DEPOSIT: &str = "DEPOSIT";
pub const TRANSACTION_TYPE_WITHDRAW: &str = "WITHDRAW";
pub const TRANSACTION_TYPE_TRANSFER: &str = "TRANSFER";
pub const TRANSACTION_TYPE_LOAN_PAYMENT: &str = "LOAN_PAYMENT";
pub const TRANSACTION_TYPE_INTEREST_PAID: &str = "INTEREST_PAID";
pub const TRANSACTION_TYPE_INTEREST_EARNED: &str = "INTEREST_EARNED";
pub const TRANSACTION_TYPE_CREDIT_CARD_SPENDING: &str = "CREDIT_CARD_SPENDING";
pub const TRANSACTION_TYPE_CREDIT_CARD_PAYMENT: &str = "CREDIT_CARD_PAYMENT";

/// Transaction status constants
pub const TRANSACTION_STATUS_CREATED: &str = "CREATED";
pub const TRANSACTION_STATUS_SCHEDULED: &str = "SCHEDULED";
pub const TRANSACTION_STATUS_POSTED: &str = "POSTED";
pub const TRANSACTION_STATUS_PENDING: &str = "PENDING";
pub const TRANSACTION_STATUS_CANCELED: &str = "CANCELED";
