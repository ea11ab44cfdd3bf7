mod account;
mod allocation;
mod index_quote;
mod product;
mod report;

pub use account::{AccountSnapshot, CalculateRequest};
pub use allocation::{Allocation, AllocationResult};
pub use index_quote::{IndexReturnQuote, IndexReturnRequest, StartDateQuery};
pub use product::{AnnuityProduct, IndexDefinition};
pub use report::{ReportBranding, ReportInput, ReportRequest};
