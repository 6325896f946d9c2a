use crate::infra::{
    InMemoryClaimRepository, InMemoryPriorAuthorityRepository, InMemorySubmissionQueue,
    TracingErrorReporter,
};
use clap::Args;
use crime_forms::error::AppError;
use crime_forms::workflows::nsm::{NsmClaimService, StepOutcome};
use crime_forms::workflows::prior_authority::PriorAuthorityService;
use crime_forms::workflows::steps::forms::FormParams;
use crime_forms::workflows::steps::money::format_pounds;
use crime_forms::workflows::steps::ports::{Provider, SubmissionJob};
use crime_forms::workflows::steps::tasks::TaskView;
use crime_forms::workflows::steps::values::Coded;
use std::fmt::Display;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Provider email used for every request in the demo
    #[arg(long, default_value = "provider@firm.test")]
    pub(crate) email: String,
    /// Office account number the demo provider works from
    #[arg(long, default_value = "1A123B")]
    pub(crate) office_code: String,
    /// Print the submitted JSON documents
    #[arg(long)]
    pub(crate) show_payloads: bool,
    /// Skip the prior authority portion of the demo
    #[arg(long)]
    pub(crate) skip_prior_authority: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        email,
        office_code,
        show_payloads,
        skip_prior_authority,
    } = args;
    let provider = Provider::new(email, vec![office_code.clone()]);
    let queue = Arc::new(InMemorySubmissionQueue::default());
    let reporter = Arc::new(TracingErrorReporter);

    println!("Non-standard magistrates' claim (crm7)");
    let claims = NsmClaimService::new(
        Arc::new(InMemoryClaimRepository::default()),
        queue.clone(),
        reporter.clone(),
    );
    let claim = claims.create(&provider, Some(office_code.clone()))?;
    println!("- Created claim {} for office {}", claim.id, office_code);

    for (step, record, params) in claim_steps(&office_code) {
        let outcome = claims.update_step(&provider, &claim.id, step, record, &params);
        print_outcome(step, outcome);
    }

    let summary = claims.cost_summary(&provider, &claim.id)?;
    println!("Claimed costs:");
    for total in &summary.work_types {
        println!(
            "  - {}: {} min -> {}",
            total.work_type.label(),
            total.minutes,
            format_pounds(total.cost)
        );
    }
    println!(
        "  - Letters and calls: {}",
        format_pounds(summary.letters_and_calls)
    );
    println!(
        "  - Total {} ({} inc. VAT)",
        format_pounds(summary.total),
        format_pounds(summary.total_inc_vat)
    );

    println!("Task list:");
    for section in claims.task_list(&provider, &claim.id)? {
        print_section(section.title, &section.tasks);
    }

    if !skip_prior_authority {
        println!("\nPrior authority application (crm4)");
        let prior_authority = PriorAuthorityService::new(
            Arc::new(InMemoryPriorAuthorityRepository::default()),
            queue.clone(),
            reporter,
        );
        let application = prior_authority.create(&provider, Some(office_code.clone()))?;
        println!("- Created application {}", application.id);

        for (step, record, params) in prior_authority_steps(&office_code) {
            let outcome = prior_authority.update_step(&provider, &application.id, step, record, &params);
            print_outcome(step, outcome);
        }

        let costs = prior_authority.costs(&provider, &application.id)?;
        println!(
            "Requested: service {} | travel {} | additional {} | total {}",
            format_pounds(costs.service_cost),
            format_pounds(costs.travel_cost),
            format_pounds(costs.additional_costs),
            format_pounds(costs.total)
        );
        println!("Task list:");
        for section in prior_authority.task_list(&provider, &application.id)? {
            print_section(section.title, &section.tasks);
        }
    }

    print_jobs(&queue.jobs(), show_payloads);
    Ok(())
}

type DemoStep = (&'static str, Option<&'static str>, FormParams);

fn claim_steps(office_code: &str) -> Vec<DemoStep> {
    vec![
        (
            "claim_type",
            None,
            FormParams::new()
                .with("claim_type", "non_standard_magistrate")
                .with("rep_order_date", "2024-06-01"),
        ),
        (
            "firm_details",
            None,
            FormParams::new()
                .with("firm_name", "Firm & Co")
                .with("account_number", office_code)
                .with("address_line_1", "1 Legal Street")
                .with("town", "London")
                .with("postcode", "SW1A 1AA")
                .with("vat_registered", "yes")
                .with("solicitor_first_name", "Jo")
                .with("solicitor_last_name", "Bloggs")
                .with("solicitor_reference_number", "SOL-1")
                .with("contact_first_name", "Sam")
                .with("contact_last_name", "Smith")
                .with("contact_email", "sam@firm.test"),
        ),
        (
            "work_item",
            Some("new"),
            FormParams::new()
                .with("work_type", "preparation")
                .with("time_spent_hours", "2")
                .with("time_spent_minutes", "0")
                .with("completed_on", "2024-06-10")
                .with("fee_earner", "JB"),
        ),
        (
            "work_item",
            Some("new"),
            FormParams::new()
                .with("work_type", "advocacy")
                .with("time_spent_hours", "6")
                .with("time_spent_minutes", "0")
                .with("completed_on", "2024-06-10")
                .with("fee_earner", "JB"),
        ),
        (
            "letters_calls",
            None,
            FormParams::new().with("letters", "2").with("calls", "3"),
        ),
    ]
}

fn prior_authority_steps(office_code: &str) -> Vec<DemoStep> {
    vec![
        ("ufn", None, FormParams::new().with("ufn", "010624/001")),
        (
            "case_contact",
            None,
            FormParams::new()
                .with("contact_name", "Sam Smith")
                .with("contact_email", "sam@firm.test")
                .with("firm_name", "Firm & Co")
                .with("firm_account_number", office_code),
        ),
        (
            "client_detail",
            None,
            FormParams::new()
                .with("client_first_name", "Jim")
                .with("client_last_name", "Bob")
                .with("client_date_of_birth", "1990-03-14"),
        ),
        (
            "primary_quote",
            None,
            FormParams::new()
                .with("service_type", "psychiatric_report")
                .with("contact_first_name", "Ada")
                .with("contact_last_name", "Lovelace")
                .with("organisation", "Expert Reports Ltd")
                .with("town", "Leeds")
                .with("postcode", "LS1 4AP")
                .with("cost_type", "per_hour")
                .with("period_hours", "2")
                .with("period_minutes", "30")
                .with("cost_per_hour", "90.00")
                .with("travel_time_hours", "1")
                .with("travel_time_minutes", "0")
                .with("travel_cost_per_hour", "40.00"),
        ),
        (
            "additional_costs",
            None,
            FormParams::new().with("additional_costs_still_to_add", "yes"),
        ),
        (
            "additional_cost_detail",
            Some("new"),
            FormParams::new()
                .with("name", "Translation")
                .with("description", "Translate the client's statement")
                .with("unit_type", "per_item")
                .with("cost_per_item", "3.50")
                .with("items", "12"),
        ),
        (
            "additional_costs",
            None,
            FormParams::new().with("additional_costs_still_to_add", "no"),
        ),
        (
            "reason_why",
            None,
            FormParams::new().with("reason_why", "Fitness to plead is in issue"),
        ),
        (
            "check_answers",
            None,
            FormParams::new()
                .with("confirm_excluding_vat", "true")
                .with("confirm_travel_expenditure", "true"),
        ),
    ]
}

fn print_outcome<E: Display>(step: &str, outcome: Result<StepOutcome, E>) {
    match outcome {
        Ok(StepOutcome::Advance(destination)) => println!(
            "  {step} -> {}#{}",
            destination.controller,
            destination.action.label()
        ),
        Ok(StepOutcome::Invalid(errors)) => {
            println!("  {step} rejected:");
            for (field, messages) in errors.messages() {
                println!("    - {field}: {}", messages.join(", "));
            }
        }
        Err(err) => println!("  {step} failed: {err}"),
    }
}

fn print_section(title: &str, tasks: &[TaskView]) {
    println!("  {title}");
    for task in tasks {
        println!("    - {}: {}", task.name, task.status_label);
    }
}

fn print_jobs(jobs: &[SubmissionJob], show_payloads: bool) {
    if jobs.is_empty() {
        println!("\nSubmissions: none queued");
        return;
    }
    println!("\nSubmissions:");
    for job in jobs {
        println!(
            "  - {} {} ({} risk)",
            job.application_type,
            job.application_id,
            job.payload["application_risk"].as_str().unwrap_or("unknown")
        );
        if show_payloads {
            match serde_json::to_string_pretty(&job.payload) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("    payload unavailable: {err}"),
            }
        }
    }
}
