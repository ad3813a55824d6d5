//! Given steps for session capacity BDD scenarios.

use super::world::{SessionCapacityWorld, run_async};
use colloquy::session::{
    config::SessionConfig,
    domain::{AlertPolicy, Message, Role, Session, SessionId, SessionLimits},
    ports::store::SessionStore,
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given("a session manager allowing {max_messages:usize} messages")]
fn session_manager_allowing(
    world: &mut SessionCapacityWorld,
    max_messages: usize,
) -> Result<(), eyre::Report> {
    let config = SessionConfig {
        max_messages,
        ..SessionConfig::default()
    };
    world
        .install_manager(&config)
        .wrap_err("install session manager")
}

#[given(r#"a session "{name}" holding {count:usize} messages"#)]
fn session_holding(
    world: &mut SessionCapacityWorld,
    name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let clock = DefaultClock;
    let id = SessionId::new(name)?;
    let roomy = SessionLimits::try_new(count.max(1), 1.0, AlertPolicy::EveryAppend)?;
    let mut session = Session::new(id, &clock);
    for index in 0..count {
        session.append(
            Message::new(Role::Originator, format!("earlier message {index}"), &clock),
            &roomy,
            &clock,
        )?;
    }
    run_async(world.store.create(&session)).wrap_err("seed session")
}

#[given(r#"session "{name}" has been archived"#)]
fn session_archived(world: &mut SessionCapacityWorld, name: String) -> Result<(), eyre::Report> {
    let id = SessionId::new(name)?;
    run_async(world.manager()?.archive_session(&id)).wrap_err("archive session")?;
    Ok(())
}
