use std::fs::File;
use std::time::Duration;

use formcheck::controller::{ControllerConfig, FormController};
use formcheck::model::Value;
use formcheck::validation::{DateRule, FieldSchema, FormSchema, Rule};
use simplelog::{Config, LevelFilter, WriteLogger};

fn opportunity_schema() -> Result<FormSchema, formcheck::error::SchemaError> {
    let schema = FormSchema::from_json(
        r#"{
            "title": {
                "required": true,
                "minLength": 5,
                "maxLength": 120,
                "messages": { "required": "Opportunity title is required" }
            },
            "stage": { "required": true },
            "value": { "required": true, "min": 0 },
            "probability": { "min": 0, "max": 100 },
            "contactEmail": { "email": true },
            "closeDate": { "required": true }
        }"#,
    )?
    .with_rule(
        "probability",
        Rule::custom(|value, data| {
            let prospect = data.value("stage").as_str() == Some("prospect");
            match value {
                Value::Int(p) if prospect && *p > 25 => {
                    Some("Prospect-stage deals cannot exceed 25% probability".to_string())
                }
                _ => None,
            }
        }),
    )?
    .with_rule("closeDate", Rule::date(DateRule::new().no_past()))?;

    Ok(schema.field("accountCode", FieldSchema::new().pattern(r"^[A-Z]{3}-\d{4}$")?))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = File::create("opportunity_form.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let config = ControllerConfig::default().with_debounce(Duration::from_millis(300));
    let form = FormController::with_config(opportunity_schema()?, config);

    // User tabs through the title field, then types
    form.blur("title");
    for partial in ["A", "Ac", "Acme", "Acme expansion"] {
        form.set_value("title", partial);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(350)).await;
    println!("title error after typing: {:?}", form.visible_error("title"));

    form.set_value("stage", "prospect");
    form.set_value("probability", 60i64);
    form.set_value("value", 250_000i64);
    form.set_value("contactEmail", "buyer.acme");

    match form.submit() {
        Ok(data) => println!("saved {} fields", data.len()),
        Err(err) => {
            println!("{err}");
            for error in err.report().errors() {
                println!("  {error}");
            }
        }
    }

    form.set_value("probability", 20i64);
    form.set_value("contactEmail", "buyer@acme.example");
    form.set_value("closeDate", "2099-03-31");
    form.set_value("accountCode", "ACM-0042");
    tokio::time::sleep(Duration::from_millis(350)).await;

    match form.submit() {
        Ok(data) => println!("saved {} fields", data.len()),
        Err(err) => println!("{err}"),
    }

    Ok(())
}
