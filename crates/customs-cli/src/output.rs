//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use customs_domain::expense;
use customs_domain::{
    Capability, Customer, Declaration, Expense, Folder, FolderRow, FolderStatus, Page,
};
use customs_engine::FolderDetail;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a single customer, with its granted capabilities when known.
    pub fn format_customer(
        &self,
        customer: &Customer,
        grants: Option<&[Capability]>,
    ) -> Result<String> {
        let granted = grants.map(|g| g.iter().map(|c| c.as_str()).collect::<Vec<_>>());
        match self.format {
            OutputFormat::Json => {
                let mut value = customer_json(customer);
                if let Some(granted) = granted {
                    value["capabilities"] = json!(granted);
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(customer.id.to_string()),
            OutputFormat::Table => {
                let address = customer.person.address.clone().unwrap_or_default();
                let active = if customer.active { "yes" } else { "no" };
                let mut rows = vec![
                    ("ID", customer.id.to_string()),
                    ("NIF", customer.regulatory_id.clone()),
                    ("Name", customer.person.full_name()),
                    ("Phone", customer.person.phone.clone()),
                    ("E-mail", customer.person.email.clone()),
                    ("Address", address),
                    ("Active", active.to_string()),
                ];
                if let Some(granted) = granted {
                    rows.push(("Capabilities", granted.join(", ")));
                }
                rows.push(("Created", customer.created_at.format("%Y-%m-%d %H:%M").to_string()));
                Ok(key_value_table(&rows))
            }
        }
    }

    /// Format a page of customers.
    pub fn format_customers(&self, page: &Page<Customer>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = page.items.iter().map(customer_json).collect();
                Ok(serde_json::to_string_pretty(&page_json(page, items))?)
            }
            OutputFormat::Quiet => Ok(join_ids(page.items.iter().map(|c| c.id.to_string()))),
            OutputFormat::Table => {
                if page.items.is_empty() {
                    return Ok(self.colorize("No customers found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "NIF", "Name", "Phone", "E-mail", "Active"]);
                for customer in &page.items {
                    builder.push_record([
                        short_id(&customer.id.to_string()),
                        customer.regulatory_id.clone(),
                        customer.person.full_name(),
                        customer.person.phone.clone(),
                        customer.person.email.clone(),
                        if customer.active { "yes" } else { "no" }.to_string(),
                    ]);
                }
                Ok(format!("{}\n{}", render(builder), self.page_footer(page)))
            }
        }
    }

    /// Format a page of folders.
    pub fn format_folders(&self, page: &Page<FolderRow>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = page.items.iter().map(folder_row_json).collect();
                Ok(serde_json::to_string_pretty(&page_json(page, items))?)
            }
            OutputFormat::Quiet => Ok(join_ids(page.items.iter().map(|r| r.folder.id.to_string()))),
            OutputFormat::Table => {
                if page.items.is_empty() {
                    return Ok(self.colorize("No folders found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record([
                    "ID", "Number", "Customer", "Harbor", "Container", "Weight", "Declaration", "Status",
                ]);
                for row in &page.items {
                    let folder = &row.folder;
                    builder.push_record([
                        short_id(&folder.id.to_string()),
                        folder.number.clone(),
                        format!("{} ({})", row.customer_name, row.customer_regulatory_id),
                        folder.harbor.clone(),
                        folder.container_number.clone().unwrap_or_default(),
                        format!("{:.1}", folder.weight),
                        row.declaration_number.clone().unwrap_or_default(),
                        self.status(folder.status),
                    ]);
                }
                Ok(format!("{}\n{}", render(builder), self.page_footer(page)))
            }
        }
    }

    /// Format a folder on its own.
    pub fn format_folder(&self, folder: &Folder) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&folder_json(folder))?),
            OutputFormat::Quiet => Ok(folder.id.to_string()),
            OutputFormat::Table => {
                let rows = [
                    ("ID", folder.id.to_string()),
                    ("Number", folder.number.clone()),
                    ("Customer", folder.customer_id.to_string()),
                    ("Harbor", folder.harbor.clone()),
                    ("Container", folder.container_number.clone().unwrap_or_default()),
                    ("Weight (kg)", format!("{:.1}", folder.weight)),
                    ("Status", self.status(folder.status)),
                    ("Opened", folder.created_at.format("%Y-%m-%d %H:%M").to_string()),
                ];
                Ok(key_value_table(&rows))
            }
        }
    }

    /// Format the expenses of a folder with their total.
    pub fn format_expenses(&self, expenses: &[Expense]) -> Result<String> {
        let total = expense::total(expenses);
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = expenses.iter().map(expense_json).collect();
                let value = json!({ "items": items, "total_amount": total });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(join_ids(expenses.iter().map(|e| e.id.to_string()))),
            OutputFormat::Table => {
                if expenses.is_empty() {
                    return Ok(self.colorize("No expenses recorded.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Type", "Amount", "Description", "Recorded"]);
                for e in expenses {
                    builder.push_record([
                        short_id(&e.id.to_string()),
                        e.kind.clone(),
                        e.amount.map(|a| format!("{:.2}", a)).unwrap_or_default(),
                        e.description.clone(),
                        e.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    ]);
                }
                let footer = self.colorize(&format!("Total: {:.2}", total), "blue");
                Ok(format!("{}\n{}", render(builder), footer))
            }
        }
    }

    /// Format a folder with its customer and milestone record.
    pub fn format_folder_detail(&self, detail: &FolderDetail) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "folder": folder_json(&detail.folder),
                    "customer": customer_json(&detail.customer),
                    "declaration": detail.declaration.as_ref().map(declaration_json),
                    "status": detail.status().as_str(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(detail.folder.id.to_string()),
            OutputFormat::Table => {
                let folder = &detail.folder;
                let rows = [
                    ("ID", folder.id.to_string()),
                    ("Number", folder.number.clone()),
                    (
                        "Customer",
                        format!("{} ({})", detail.customer.person.full_name(), detail.customer.regulatory_id),
                    ),
                    ("Harbor", folder.harbor.clone()),
                    ("Container", folder.container_number.clone().unwrap_or_default()),
                    ("Weight (kg)", format!("{:.1}", folder.weight)),
                    ("Status", self.status(detail.status())),
                    ("Opened", folder.created_at.format("%Y-%m-%d %H:%M").to_string()),
                ];
                let mut out = key_value_table(&rows);
                if let Some(declaration) = &detail.declaration {
                    out.push('\n');
                    out.push_str(&milestone_table(declaration));
                }
                Ok(out)
            }
        }
    }

    /// Format a milestone record.
    pub fn format_declaration(&self, declaration: &Declaration) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&declaration_json(declaration))?),
            OutputFormat::Quiet => Ok(declaration.id.to_string()),
            OutputFormat::Table => Ok(format!(
                "{}\nStatus: {}",
                milestone_table(declaration),
                self.status(declaration.status())
            )),
        }
    }

    /// Format a folder status.
    pub fn format_status(&self, status: FolderStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(json!({ "status": status.as_str() }).to_string()),
            OutputFormat::Quiet => Ok(status.as_str().to_string()),
            OutputFormat::Table => Ok(self.status(status)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Whether output is machine-readable.
    pub fn is_structured(&self) -> bool {
        !matches!(self.format, OutputFormat::Table)
    }

    fn status(&self, status: FolderStatus) -> String {
        let color = match status {
            FolderStatus::Open => "cyan",
            FolderStatus::Declared | FolderStatus::Liquidated => "yellow",
            FolderStatus::Receipted => "magenta",
            FolderStatus::Released => "green",
        };
        self.colorize(status.as_str(), color)
    }

    fn page_footer<T>(&self, page: &Page<T>) -> String {
        let text = format!(
            "Page {} of {} ({} total)",
            page.page,
            page.total_pages().max(1),
            page.total
        );
        self.colorize(&text, "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn key_value_table(rows: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value.clone()]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn milestone_table(declaration: &Declaration) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Stage", "Reference", "Date", "Document"]);
    let filing = &declaration.filing;
    builder.push_record([
        "Declaration".to_string(),
        filing.number.clone(),
        filing.date.to_string(),
        document(filing.document_ref.as_ref()),
    ]);
    if let Some(l) = &declaration.liquidation {
        builder.push_record([
            "Liquidation".to_string(),
            l.bulletin.clone(),
            l.date.to_string(),
            document(l.document_ref.as_ref()),
        ]);
    }
    if let Some(r) = &declaration.receipt {
        builder.push_record([
            "Receipt".to_string(),
            r.number.clone(),
            r.date.to_string(),
            document(r.document_ref.as_ref()),
        ]);
    }
    if let Some(b) = &declaration.release_order {
        builder.push_record([
            "Release order".to_string(),
            b.number.clone(),
            b.date.to_string(),
            document(b.document_ref.as_ref()),
        ]);
    }
    render(builder)
}

fn document(document: Option<&customs_domain::DocumentRef>) -> String {
    document.map(|d| d.to_string()).unwrap_or_default()
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn join_ids(ids: impl Iterator<Item = String>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

fn page_json<T>(page: &Page<T>, items: Vec<Value>) -> Value {
    json!({
        "items": items,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "total_pages": page.total_pages(),
    })
}

fn customer_json(customer: &Customer) -> Value {
    json!({
        "id": customer.id.to_string(),
        "regulatory_id": customer.regulatory_id,
        "first_name": customer.person.first_name,
        "last_name": customer.person.last_name,
        "phone": customer.person.phone,
        "email": customer.person.email,
        "address": customer.person.address,
        "active": customer.active,
        "created_at": customer.created_at.to_rfc3339(),
    })
}

fn folder_json(folder: &Folder) -> Value {
    json!({
        "id": folder.id.to_string(),
        "number": folder.number,
        "weight": folder.weight,
        "harbor": folder.harbor,
        "container_number": folder.container_number,
        "customer_id": folder.customer_id.to_string(),
        "status": folder.status.as_str(),
        "created_at": folder.created_at.to_rfc3339(),
    })
}

fn expense_json(expense: &Expense) -> Value {
    json!({
        "id": expense.id.to_string(),
        "folder_id": expense.folder_id.to_string(),
        "type": expense.kind,
        "amount": expense.amount,
        "description": expense.description,
        "created_at": expense.created_at.to_rfc3339(),
    })
}

fn folder_row_json(row: &FolderRow) -> Value {
    let mut value = folder_json(&row.folder);
    value["customer_regulatory_id"] = json!(row.customer_regulatory_id);
    value["customer_name"] = json!(row.customer_name);
    value["declaration_number"] = json!(row.declaration_number);
    value
}

fn stage_json(reference: &str, date: chrono::NaiveDate, document: Option<&customs_domain::DocumentRef>) -> Value {
    json!({
        "reference": reference,
        "date": date.to_string(),
        "document": document.map(|d| d.as_str()),
    })
}

fn declaration_json(declaration: &Declaration) -> Value {
    let filing = &declaration.filing;
    json!({
        "id": declaration.id.to_string(),
        "folder_id": declaration.folder_id.to_string(),
        "number": filing.number,
        "date": filing.date.to_string(),
        "destination_office": filing.destination_office,
        "verifier": filing.verifier,
        "document": filing.document_ref.as_ref().map(|d| d.as_str()),
        "liquidation": declaration.liquidation.as_ref()
            .map(|l| stage_json(&l.bulletin, l.date, l.document_ref.as_ref())),
        "receipt": declaration.receipt.as_ref()
            .map(|r| stage_json(&r.number, r.date, r.document_ref.as_ref())),
        "release_order": declaration.release_order.as_ref()
            .map(|b| stage_json(&b.number, b.date, b.document_ref.as_ref())),
        "status": declaration.status().as_str(),
        "updated_at": declaration.updated_at.to_rfc3339(),
    })
}
