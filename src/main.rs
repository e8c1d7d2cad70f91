use std::{process, sync::Arc, time::Duration};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vellum::{
    application::{
        accounts::SignupForm,
        context::AppContext,
        error::AppError,
        repos::{ItemRepository, UserRepository},
        sessions::set_cookie_header,
    },
    config,
    infra::{
        memory::{InMemoryPosts, InMemoryUsers},
        telemetry,
    },
    security::{DigestCodec, PasswordHasher},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or_else(|| config::Command::Demo(config::DemoArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Sign(args) => run_sign(&settings, args),
        config::Command::Verify(args) => run_verify(&settings, args),
        config::Command::HashPassword(args) => run_hash_password(&settings, args),
        config::Command::CheckPassword(args) => run_check_password(&settings, args),
        config::Command::Demo(args) => run_demo(&settings, args).await,
    }
}

fn run_sign(settings: &config::Settings, args: config::SignArgs) -> Result<(), AppError> {
    let codec = DigestCodec::new(&settings.security.secret_key)?;
    println!("{}", codec.sign(&args.payload));
    Ok(())
}

fn run_verify(settings: &config::Settings, args: config::VerifyArgs) -> Result<(), AppError> {
    let codec = DigestCodec::new(&settings.security.secret_key)?;
    let payload = codec
        .verify(&args.token)
        .ok_or_else(|| AppError::unexpected("token signature does not verify"))?;
    println!("{payload}");
    Ok(())
}

fn run_hash_password(
    settings: &config::Settings,
    args: config::HashPasswordArgs,
) -> Result<(), AppError> {
    let hasher = PasswordHasher::new(settings.security.salt_length.get());
    let record = match args.salt.as_deref() {
        Some(salt) => hasher.hash_password_with_salt(&args.name, &args.password, salt),
        None => hasher.hash_password(&args.name, &args.password),
    };
    println!("{record}");
    Ok(())
}

fn run_check_password(
    settings: &config::Settings,
    args: config::CheckPasswordArgs,
) -> Result<(), AppError> {
    let hasher = PasswordHasher::new(settings.security.salt_length.get());
    if !hasher.verify_password(&args.name, &args.password, &args.record) {
        return Err(AppError::unexpected("password does not match record"));
    }
    println!("ok");
    Ok(())
}

async fn run_demo(settings: &config::Settings, args: config::DemoArgs) -> Result<(), AppError> {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUsers::new());
    let posts: Arc<dyn ItemRepository> = Arc::new(InMemoryPosts::new());
    let app = AppContext::new(settings, users, posts)?;

    let registered = app
        .accounts
        .signup(SignupForm {
            username: "demo".to_string(),
            password: "demo-pass".to_string(),
            verify: "demo-pass".to_string(),
            email: Some("demo@example.com".to_string()),
        })
        .await?;
    println!("Set-Cookie: {}", set_cookie_header(&registered.token));

    let logged_in = app.accounts.login("demo", "demo-pass").await?;
    let author = app
        .sessions
        .current_user(&logged_in.token)
        .await
        .ok_or_else(|| AppError::unexpected("fresh session did not resolve"))?;
    info!(user_id = author.id, "demo user signed in");

    let mut last_id = None;
    for index in 1..=args.posts {
        let id = app
            .posts
            .create_post(
                &format!("Post {index}"),
                &format!("Body of post {index}."),
                Some(&author),
            )
            .await?;
        last_id = Some(id);
    }

    let front = app.posts.front_page().await;
    println!("front page ({}): {} posts", front.label(), front.value.len());

    tokio::time::sleep(Duration::from_secs(args.pause_secs)).await;

    let front = app.posts.front_page().await;
    for post in &front.value {
        println!("  #{} {}", post.id, post.subject);
    }
    println!("front page ({})", front.label());

    if let Some(id) = last_id {
        let post = app.posts.permalink(id).await?;
        println!("permalink #{id} ({}): {}", post.label(), post.value.subject);
        println!("{}", app.posts.permalink_json(id).await?);
    }
    println!("{}", app.posts.front_json().await?);

    println!("Set-Cookie: {}", set_cookie_header(&app.accounts.logout()));
    Ok(())
}
