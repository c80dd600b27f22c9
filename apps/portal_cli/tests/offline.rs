use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

/// A `portal` command isolated from the caller's environment and working dir.
fn portal(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("portal")?;
    cmd.current_dir(dir.path())
        .env_remove("PORTAL_BASE_URL")
        .env_remove("PORTAL_PROFILE_ID")
        .env_remove("PORTAL_ADMIN_USER")
        .env_remove("PORTAL_ADMIN_PASSWORD")
        .env("PORTAL_CART", dir.path().join("cart.json"));
    Ok(cmd)
}

#[test]
fn help_lists_commands() -> Result<()> {
    let dir = tempdir()?;
    portal(&dir)?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("browse"))
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("index"));
    Ok(())
}

#[test]
fn profile_with_blank_fields_is_rejected_before_any_request() -> Result<()> {
    let dir = tempdir()?;
    portal(&dir)?
        .args(["--base-url", "http://127.0.0.1:9"])
        .args(["profile", "--name", "Nimal", "--age", "34", "--email", ""])
        .args(["--phone", "0771234567", "--job", "", "--desire", "Passport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("All fields are required"))
        .stderr(predicate::str::contains("email, job"));
    assert!(!dir.path().join("profile_id").exists());
    Ok(())
}

#[test]
fn bad_base_url_is_reported() -> Result<()> {
    let dir = tempdir()?;
    portal(&dir)?
        .args(["--base-url", "portal.local", "search", "passport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base url must start with http://"));
    Ok(())
}

#[test]
fn empty_cart_is_listed_and_unknown_lines_fail() -> Result<()> {
    let dir = tempdir()?;
    portal(&dir)?
        .args(["cart", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your cart is empty"));
    portal(&dir)?
        .args(["cart", "remove", "p-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("p-404 is not in the cart"));
    Ok(())
}

#[test]
fn cart_updates_persist_between_runs() -> Result<()> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("cart.json"),
        r#"[{"id":"p1","name":"Solar lamp","price":12.5,"quantity":2}]"#,
    )?;
    portal(&dir)?
        .args(["cart", "update", "p1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cart: 3 items, total 37.50"));
    portal(&dir)?
        .args(["cart", "update", "p1", "-3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cart: 0 items"));
    let saved = fs::read_to_string(dir.path().join("cart.json"))?;
    assert_eq!(saved.trim(), "[]");
    Ok(())
}

#[test]
fn checkout_needs_a_profile() -> Result<()> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("cart.json"),
        r#"[{"id":"p1","name":"Solar lamp","price":12.5,"quantity":1}]"#,
    )?;
    portal(&dir)?
        .args(["--base-url", "http://127.0.0.1:9", "checkout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a profile is required before checkout"));
    Ok(())
}
