use sgate_derive::sgate_error;
use std::borrow::Cow;

#[sgate_error]
pub enum FixtureError {
    #[error("Fixture I/O failed{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
    #[error("Fixture rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Internal fixture error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
}

#[test]
fn context_is_attached_to_source_errors() {
    let err = read_missing().context("reading fixture file").unwrap_err();
    assert!(matches!(err, FixtureError::Io { .. }));
    assert_eq!(err.to_string(), "Fixture I/O failed (reading fixture file): no such file");
}

#[test]
fn question_mark_converts_source_without_context() {
    fn run() -> Result<(), FixtureError> {
        read_missing()?;
        Ok(())
    }

    let err = run().unwrap_err();
    assert_eq!(err.to_string(), "Fixture I/O failed: no such file");
}

#[test]
fn context_overwrites_on_own_error_type() {
    let res: Result<(), FixtureError> =
        Err(FixtureError::Rejected { message: "bad origin".into(), context: None });
    let err = res.context("preflight").unwrap_err();
    assert_eq!(err.to_string(), "Fixture rejected (preflight): bad origin");
}

#[test]
fn strings_become_internal_errors() {
    let from_static: FixtureError = "boom".into();
    let from_owned: FixtureError = String::from("kaboom").into();
    assert!(matches!(from_static, FixtureError::Internal { .. }));
    assert_eq!(from_owned.to_string(), "Internal fixture error: kaboom");
}
