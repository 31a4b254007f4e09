mod common;

use assert_cmd::Command;
use common::{seeded_store_file, temp_path, PASSWORD};
use predicates::{prelude::*, str::contains};
use vault_core::{
    cli::SCRIPT_ENV,
    store::{Credential, Store},
};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("vault_core_cli").expect("binary");
    cmd.env(SCRIPT_ENV, "1")
        .env("VAULT_CORE_HOME", temp_path("home"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_lists_and_searches() {
    let path = seeded_store_file();
    cli()
        .arg(&path)
        .write_stdin(format!("{PASSWORD}\nls\nfind title mail\nquit\n"))
        .assert()
        .success()
        .stdout(contains(format!("Accessing : {}", path.display())))
        .stdout(contains("[Root] vault > ls"))
        .stdout(contains("Bank"))
        .stdout(contains("Found 1 records"))
        .stdout(contains("GoodBye!"))
        .stdout(contains(PASSWORD).not());
}

#[test]
fn missing_store_file_exits_with_error() {
    let path = temp_path("absent.store");
    cli()
        .arg(&path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains(format!("ERROR: {} Does not exist", path.display())));
}

#[test]
fn wrong_password_exits_before_the_session() {
    let path = seeded_store_file();
    cli()
        .arg(&path)
        .write_stdin("not the password\nls\n")
        .assert()
        .failure()
        .stderr(contains("Bad credentials"))
        .stdout(contains("vault >").not());
}

#[test]
fn missing_log_config_is_reported() {
    let path = seeded_store_file();
    let config = temp_path("log.toml");
    cli()
        .arg(&path)
        .arg("--logcfg")
        .arg(&config)
        .write_stdin(format!("{PASSWORD}\nquit\n"))
        .assert()
        .failure()
        .stderr(contains(format!(
            "Logging configuration file not found: {}.",
            config.display()
        )));
}

#[test]
fn log_config_file_receives_events() {
    let path = seeded_store_file();
    let config = temp_path("log.toml");
    let log = config.with_file_name("vault.log");
    std::fs::write(
        &config,
        format!(
            "[logconfig]\nlevel = \"info\"\nfile = {:?}\nansi = false\n",
            log.display().to_string()
        ),
    )
    .expect("write config");
    cli()
        .arg(&path)
        .arg("--logcfg")
        .arg(&config)
        .write_stdin(format!("{PASSWORD}\nls\nquit\n"))
        .assert()
        .success();
    let written = std::fs::read_to_string(&log).expect("log file");
    assert!(written.contains("store opened"));
    assert!(!written.contains(PASSWORD));
}

#[test]
fn getpass_and_password_change_round_trip() {
    let path = seeded_store_file();
    let store = Store::open(&path, Credential::new(PASSWORD)).expect("open");
    let mail = store
        .database()
        .entries()
        .into_iter()
        .find(|entry| entry.title.as_deref() == Some("Mail"))
        .map(|entry| entry.id)
        .expect("mail");
    drop(store);

    cli()
        .arg(&path)
        .write_stdin(format!(
            "{PASSWORD}\ngetpass {mail}\nchgpwd\n{PASSWORD}\nnew-secret\ny\nquit\n"
        ))
        .assert()
        .success()
        .stdout(contains("pw1"))
        .stdout(contains("Database password changed"));

    assert!(Store::open(&path, Credential::new("new-secret")).is_ok());
    assert!(Store::open(&path, Credential::new(PASSWORD))
        .err()
        .is_some_and(|err| err.is_auth()));
}

#[test]
fn init_creates_an_empty_store_and_opens_it() {
    let path = temp_path("fresh.store");
    cli()
        .arg("--init")
        .arg(&path)
        .write_stdin("s3cret\ns3cret\nls\nquit\n")
        .assert()
        .success()
        .stdout(contains(format!("Created : {}", path.display())))
        .stdout(contains("[Root] vault > ls"))
        .stdout(contains("No entries found"))
        .stdout(contains("GoodBye!"))
        .stdout(contains("s3cret").not());

    let store = Store::open(&path, Credential::new("s3cret")).expect("open new store");
    assert!(store.database().entries().is_empty());
}

#[test]
fn init_refuses_existing_files() {
    let path = seeded_store_file();
    cli()
        .arg("--init")
        .arg(&path)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains(format!("ERROR: {} already exists", path.display())));
    assert!(Store::open(&path, Credential::new(PASSWORD)).is_ok());
}

#[test]
fn init_with_mismatched_passwords_writes_nothing() {
    let path = temp_path("fresh.store");
    cli()
        .arg("--init")
        .arg(&path)
        .write_stdin("s3cret\nsecret\n")
        .assert()
        .failure()
        .stderr(contains("Passwords do not match"));
    assert!(!path.exists());
}

#[test]
fn end_of_input_says_goodbye() {
    let path = seeded_store_file();
    cli()
        .arg(&path)
        .write_stdin(format!("{PASSWORD}\nbogus\n"))
        .assert()
        .success()
        .stdout(contains("Unknown command `bogus`"))
        .stdout(contains("GoodBye!"));
}
