pub struct BillingService;

pub const SERVICE_NAME: &str = "billing";
pub const PORT: u16 = 8080;
