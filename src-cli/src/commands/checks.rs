//! Local credential checks

use anyhow::Result;
use voyage_core::{validate_email, validate_password};

pub fn password(password: &str, json: bool) -> Result<()> {
    let assessment = validate_password(password);

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    println!("Strength: {}", assessment.strength);
    if assessment.is_valid {
        println!("Meets all sign-up rules");
    } else {
        for error in &assessment.errors {
            println!("  - {error}");
        }
    }
    Ok(())
}

pub fn email(email: &str, json: bool) -> Result<()> {
    let assessment = validate_email(email);

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    match assessment.error {
        Some(error) => println!("{error}"),
        None => println!("{email} can be used to sign up"),
    }
    Ok(())
}
