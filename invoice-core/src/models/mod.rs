mod estimate;
mod invoice;
mod line_item;
mod numbering;
mod payment;
mod status;

pub use estimate::{Estimate, EstimateContent, NewEstimate};
pub use invoice::{Invoice, InvoiceBalance, InvoiceContent, NewInvoice};
pub use line_item::{DocumentLineItem, NewDocumentLineItem, resolve_line_items};
pub use numbering::{ESTIMATE_PREFIX, INVOICE_PREFIX, format_document_number};
pub use payment::{NewPayment, Payment};
pub use status::{EstimateStatus, InvoiceStatus};
