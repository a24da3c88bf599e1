pub mod amount;
pub mod config;
pub mod csv;
pub mod easyslip;
pub mod jsonl;
pub mod matching;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod service;
pub mod store;

pub use amount::Amount;
pub use config::Config;
pub use model::{OcrResult, PaymentType, ProxyType, Transaction, TransactionId, TransactionStatus};
pub use reconcile::{Reconciler, Rejection, Verdict};
pub use service::SlipService;
