//! Behaviour-driven tests for the gateway bootstrap.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd::{assert_step_err, assert_step_ok};
use rstest_bdd_macros::{given, scenario, then, when};

use super::*;

struct BootstrapWorld {
    config: RefCell<AppConfig>,
    outcome: RefCell<Option<Result<GatewayBootstrap>>>,
}

impl BootstrapWorld {
    fn new() -> Self {
        Self {
            config: RefCell::new(AppConfig::default()),
            outcome: RefCell::new(None),
        }
    }

    fn bootstrap(&self) {
        let result = GatewayBootstrap::prepare(&self.config.borrow());
        self.outcome.borrow_mut().replace(result);
    }
}

#[fixture]
fn world() -> BootstrapWorld {
    let world = BootstrapWorld::new();
    {
        let mut config = world.config.borrow_mut();
        config.host = "127.0.0.1".to_owned();
        config.udf = "team-score".to_owned();
    }
    world
}

#[given("a gateway configuration on host \"{host}\" and port {port}")]
fn given_bind(world: &BootstrapWorld, host: String, port: u16) {
    let mut config = world.config.borrow_mut();
    config.host = host;
    config.port = port;
}

#[given("the UDF \"{udf}\" is selected")]
fn given_udf(world: &BootstrapWorld, udf: String) { world.config.borrow_mut().udf = udf; }

#[when("I bootstrap the gateway")]
fn when_bootstrap(world: &BootstrapWorld) { world.bootstrap(); }

#[then("the gateway binds \"{bind}\"")]
fn then_matches_bind(world: &BootstrapWorld, bind: String) {
    let outcome_ref = world.outcome.borrow();
    let Some(outcome) = outcome_ref.as_ref() else {
        panic!("bootstrap not executed");
    };
    let bootstrap = assert_step_ok!(outcome.as_ref().map_err(ToString::to_string));
    assert_eq!(bootstrap.serve.bind.to_string(), bind);
}

#[then("bootstrap fails with message \"{message}\"")]
fn then_failure(world: &BootstrapWorld, message: String) {
    let outcome_ref = world.outcome.borrow();
    let Some(outcome) = outcome_ref.as_ref() else {
        panic!("bootstrap not executed");
    };
    let text = assert_step_err!(outcome.as_ref().map(|_| ()).map_err(ToString::to_string));
    assert!(
        text.contains(&message),
        "expected '{text}' to contain '{message}'"
    );
}

#[scenario(path = "tests/features/gateway_bootstrap.feature", index = 0)]
fn accepts_bind(world: BootstrapWorld) { let _ = world; }

#[scenario(path = "tests/features/gateway_bootstrap.feature", index = 1)]
fn rejects_host(world: BootstrapWorld) { let _ = world; }

#[scenario(path = "tests/features/gateway_bootstrap.feature", index = 2)]
fn rejects_udf(world: BootstrapWorld) { let _ = world; }
