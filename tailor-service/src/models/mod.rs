pub mod bill;
pub mod setting;
pub mod workflow;

pub use bill::{next_bill_no, Bill, BillStatus, Measurements, NewBill};
pub use setting::{Setting, UPI_KEY};
pub use workflow::{JobStatus, NewJob, Stage, WorkflowJob};
