mod chicane;
mod dynamodb;

pub use chicane::{AgentRegistration, ChicaneStatus};
pub use dynamodb::DynamoDbStatus;
