pub mod budget;
pub mod grant;

pub use budget::{Amount, BudgetItem};
pub use grant::{
    is_truthy, GenerateResponse, GenerationRequest, GenerationStatus, GrantContent,
    OrganizationInfo, Section, StatusResponse,
};
