//! Login flow demo.
//!
//! Drives an authentication automaton through a full session: a `Login`
//! input authorizes an effect standing in for the network round trip,
//! whose result feeds back into the machine as a new input.
//!
//! Run with `RUST_LOG=debug` to see the engine's transition logging.

use automat_engine::{Automaton, Composite, Effect, Feedback, Rule};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
enum AuthState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

#[derive(Debug, Clone, PartialEq)]
enum AuthInput {
    Login,
    LoginOk,
    Logout,
    LogoutOk,
}

fn mapping() -> Composite<AuthState, AuthInput> {
    // The server round trips are effects: they run off the engine and
    // report back through the same input stream.
    let login_call = Effect::new(|feedback: Feedback<AuthInput>| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        feedback.send(AuthInput::LoginOk).await
    })
    .kind("session")
    .cancel_previous();

    let logout_call = Effect::new(|feedback: Feedback<AuthInput>| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        feedback.send(AuthInput::LogoutOk).await
    })
    .kind("session")
    .cancel_previous();

    Composite::new()
        .with(
            Rule::on(AuthInput::Login)
                .from(AuthState::LoggedOut)
                .go(AuthState::LoggingIn)
                .with_effect(login_call),
        )
        .with(
            Rule::on(AuthInput::LoginOk)
                .from(AuthState::LoggingIn)
                .go(AuthState::LoggedIn),
        )
        .with(
            Rule::on(AuthInput::Logout)
                .from(AuthState::LoggedIn)
                .go(AuthState::LoggingOut)
                .with_effect(logout_call),
        )
        .with(
            Rule::on(AuthInput::LogoutOk)
                .from(AuthState::LoggingOut)
                .go(AuthState::LoggedOut),
        )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let automaton = Automaton::start(AuthState::LoggedOut, mapping());
    let mut replies = automaton.subscribe_replies();

    automaton.send(AuthInput::Login).await.unwrap();

    // Four replies: login, its effect's loginOk, logout, its logoutOk.
    for step in 1..=4 {
        let reply = replies.recv().await.unwrap();
        println!(
            "[{}] {:?}: {:?} -> {:?}",
            step, reply.input, reply.from_state, reply.to_state
        );

        if reply.to_state == Some(AuthState::LoggedIn) {
            automaton.send(AuthInput::Logout).await.unwrap();
        }
    }

    println!("final state: {:?}", automaton.state());
    automaton.close().await;
}
