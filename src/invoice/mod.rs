//! Invoices (transactions) and their attachments.
//!
//! This module contains:
//! - The `Invoice` model and the database functions for it
//! - Attachment storage on disk
//! - The page for adding an invoice and the endpoints for creating,
//!   deleting and downloading the attachment of an invoice

mod attachment;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod download_endpoint;

pub use attachment::{AttachmentStore, original_file_name};
pub use core::{
    Invoice, InvoiceId, Invoices, NewInvoice, Upload, create_invoice, create_invoice_table,
    delete_invoice, distinct_categories, get_invoice, list_invoices,
};
pub use create_endpoint::create_invoice_endpoint;
pub use create_page::{get_add_invoice_page, get_add_invoice_page_with_direction};
pub use delete_endpoint::delete_invoice_endpoint;
pub use download_endpoint::download_attachment_endpoint;
