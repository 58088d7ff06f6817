//! Unit tests for template domain values.

use crate::template::domain::{TemplateDomainError, TemplateTitle, TimeOfDay};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn blank_titles_are_rejected(#[case] raw: &str) {
    assert_eq!(
        TemplateTitle::new(raw),
        Err(TemplateDomainError::EmptyTitle)
    );
}

#[rstest]
fn titles_are_trimmed() -> eyre::Result<()> {
    let title = TemplateTitle::new("  Prepare breakfast  ")?;
    ensure!(title.as_str() == "Prepare breakfast");
    Ok(())
}

#[rstest]
#[case("08:30")]
#[case("00:00")]
#[case("23:59")]
fn valid_times_parse_and_render(#[case] raw: &str) -> eyre::Result<()> {
    let time = TimeOfDay::parse(raw)?;
    ensure!(time.to_string() == raw);
    Ok(())
}

#[rstest]
#[case("8am")]
#[case("25:00")]
#[case("12:60")]
#[case("noon")]
fn invalid_times_are_rejected(#[case] raw: &str) {
    assert_eq!(
        TimeOfDay::parse(raw),
        Err(TemplateDomainError::InvalidTimeOfDay(raw.to_owned()))
    );
}
