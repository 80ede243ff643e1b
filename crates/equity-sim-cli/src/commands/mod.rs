pub mod compare;
pub mod estimate;
pub mod jurisdictions;
pub mod scenario;
pub mod tax;
