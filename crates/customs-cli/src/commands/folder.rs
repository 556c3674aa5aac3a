//! Folder command implementation.

use super::Session;
use crate::cli::{AddExpenseArgs, CreateFolderArgs, ExpenseAction, FolderAction, ListFoldersArgs};
use crate::error::{CliError, Result};
use customs_domain::{FolderQuery, NewExpense, NewFolder};

/// Execute a folder command.
pub fn execute_folder(action: FolderAction, session: &mut Session) -> Result<()> {
    match action {
        FolderAction::Create(args) => create(args, session),
        FolderAction::Show { id } => {
            let detail = session.engine.folders().get_folder(&session.actor, id)?;
            println!("{}", session.formatter.format_folder_detail(&detail)?);
            Ok(())
        }
        FolderAction::Status { id } => {
            let status = session.engine.folders().get_status(&session.actor, id)?;
            println!("{}", session.formatter.format_status(status)?);
            Ok(())
        }
        FolderAction::List(args) => list(args, session),
        FolderAction::Expense { action } => execute_expense(action, session),
    }
}

fn create(args: CreateFolderArgs, session: &mut Session) -> Result<()> {
    if !args.weight.is_finite() {
        return Err(CliError::InvalidInput(format!("Invalid weight: {}", args.weight)));
    }

    let request = NewFolder {
        number: args.number,
        weight: args.weight,
        harbor: args.harbor,
        container_number: args.container,
        customer_id: args.customer,
    };

    let folder = session.engine.folders().create_folder(&session.actor, request)?;
    println!("{}", session.formatter.format_folder(&folder)?);
    Ok(())
}

fn list(args: ListFoldersArgs, session: &mut Session) -> Result<()> {
    let query = FolderQuery {
        status: args.status,
        customer_id: args.customer,
        search: args.search,
        sort: args.sort.into(),
        direction: args.page.direction(),
        page: session.page_request(&args.page),
    };

    let page = session.engine.folders().list_folders(&session.actor, query)?;
    println!("{}", session.formatter.format_folders(&page)?);
    Ok(())
}

fn execute_expense(action: ExpenseAction, session: &mut Session) -> Result<()> {
    match action {
        ExpenseAction::Add(args) => add_expense(args, session),
        ExpenseAction::List { folder } => {
            let expenses = session.engine.folders().list_expenses(&session.actor, folder)?;
            println!("{}", session.formatter.format_expenses(&expenses)?);
            Ok(())
        }
    }
}

fn add_expense(args: AddExpenseArgs, session: &mut Session) -> Result<()> {
    let request = NewExpense {
        kind: args.kind,
        amount: args.amount,
        description: args.description,
    };

    let expense = session
        .engine
        .folders()
        .record_expense(&session.actor, args.folder, request)?;
    println!("{}", session.formatter.format_expenses(std::slice::from_ref(&expense))?);
    Ok(())
}
