//! Customer command implementation.

use super::Session;
use crate::cli::{CreateCustomerArgs, CustomerAction, ListCustomersArgs, UpdateCustomerArgs};
use crate::error::Result;
use customs_domain::{
    CustomerId, CustomerQuery, CustomerUpdate, NewCustomer, PersonFields, PersonPatch,
    ONBOARDING_CAPABILITIES,
};

/// Execute a customer command.
pub fn execute_customer(action: CustomerAction, session: &mut Session) -> Result<()> {
    match action {
        CustomerAction::Create(args) => create(args, session),
        CustomerAction::Update(args) => update(args, session),
        CustomerAction::Show { id } => show(id, session),
        CustomerAction::List(args) => list(args, session),
        CustomerAction::Activate { id } => set_active(id, true, session),
        CustomerAction::Deactivate { id } => set_active(id, false, session),
        CustomerAction::Verify { id, credential } => verify(id, &credential, session),
    }
}

fn create(args: CreateCustomerArgs, session: &mut Session) -> Result<()> {
    let request = NewCustomer {
        regulatory_id: args.regulatory_id,
        person: PersonFields {
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            email: args.email,
            address: args.address,
        },
        credential: args.credential,
    };

    let customer = session.engine.identity().create_customer(&session.actor, request)?;
    let output = session
        .formatter
        .format_customer(&customer, Some(&ONBOARDING_CAPABILITIES[..]))?;
    println!("{}", output);
    Ok(())
}

fn update(args: UpdateCustomerArgs, session: &mut Session) -> Result<()> {
    let address = if args.clear_address {
        Some(None)
    } else {
        args.address.map(Some)
    };
    let update = CustomerUpdate {
        regulatory_id: args.regulatory_id,
        person: PersonPatch {
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            email: args.email,
            address,
        },
        credential: args.credential,
    };

    let customer = session
        .engine
        .identity()
        .update_customer(&session.actor, args.id, update)?;
    println!("{}", session.formatter.format_customer(&customer, None)?);
    Ok(())
}

fn show(id: CustomerId, session: &mut Session) -> Result<()> {
    let identity = session.engine.identity();
    let customer = identity.find_by_id(&session.actor, id)?;
    let grants = identity.granted_capabilities(&session.actor, id)?;
    println!("{}", session.formatter.format_customer(&customer, Some(grants.as_slice()))?);
    Ok(())
}

fn set_active(id: CustomerId, active: bool, session: &mut Session) -> Result<()> {
    let customer = session
        .engine
        .identity()
        .set_customer_active(&session.actor, id, active)?;
    println!("{}", session.formatter.format_customer(&customer, None)?);
    Ok(())
}

fn verify(id: CustomerId, credential: &str, session: &mut Session) -> Result<()> {
    let valid = session
        .engine
        .identity()
        .verify_credential(&session.actor, id, credential)?;

    let formatter = &session.formatter;
    if formatter.is_structured() {
        println!("{}", serde_json::json!({ "customer": id.to_string(), "valid": valid }));
    } else if valid {
        println!("{}", formatter.success("Credential matches"));
    } else {
        println!("{}", formatter.error("Credential does not match"));
    }
    Ok(())
}

fn list(args: ListCustomersArgs, session: &mut Session) -> Result<()> {
    let active = match (args.active, args.inactive) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let query = CustomerQuery {
        search: args.search,
        active,
        sort: args.sort.into(),
        direction: args.page.direction(),
        page: session.page_request(&args.page),
    };

    let page = session.engine.query().customers(&session.actor, query)?;
    println!("{}", session.formatter.format_customers(&page)?);
    Ok(())
}
