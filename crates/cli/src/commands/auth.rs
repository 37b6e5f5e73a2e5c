//! Sign-in, sign-up, logout and password recovery.

use bazaar_client::guard::post_login_redirect;
use tracing::info;

use super::{CliError, Context};

/// Sign in and print where the account lands.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the token cannot be
/// saved.
pub async fn login(
    ctx: &mut Context,
    login: &str,
    password: &str,
    next: Option<&str>,
) -> Result<(), CliError> {
    let user = ctx.session.login(login, password).await?;
    ctx.cache.clear();
    ctx.notices.push(format!("Welcome, {}", user.display_name()));
    println!("Signed in as {} ({})", user.display_name(), user.role);
    println!("Continue at {}", post_login_redirect(next, user.role));
    Ok(())
}

/// Create a customer account directly.
///
/// # Errors
///
/// Returns an error if the account cannot be created.
pub async fn signup(
    ctx: &mut Context,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let email = bazaar_core::Email::parse(email)
        .map_err(|e| CliError::Usage(format!("Invalid email: {e}")))?;
    let user = ctx.session.signup(name, email.as_str(), password).await?;
    ctx.cache.clear();
    println!("Account created, signed in as {}", user.display_name());
    Ok(())
}

/// First step of the emailed-code sign-up.
///
/// # Errors
///
/// Returns an error if the code cannot be sent.
pub async fn request_signup_code(
    ctx: &Context,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let email = bazaar_core::Email::parse(email)
        .map_err(|e| CliError::Usage(format!("Invalid email: {e}")))?;
    ctx.session
        .request_signup_otp(name, email.as_str(), password)
        .await?;
    println!("A code was sent to {email}. Finish with `bazaar signup verify`.");
    Ok(())
}

/// Second step of the emailed-code sign-up.
///
/// # Errors
///
/// Returns an error if the code is rejected.
pub async fn verify_signup_code(
    ctx: &mut Context,
    email: &str,
    code: &str,
) -> Result<(), CliError> {
    let user = ctx.session.verify_signup_otp(email.trim(), code.trim()).await?;
    ctx.cache.clear();
    println!("Account verified, signed in as {}", user.display_name());
    Ok(())
}

/// Sign out. Local carts and wishlists are kept.
pub async fn logout(ctx: &mut Context) {
    ctx.session.logout().await;
    ctx.cache.clear();
    println!("Signed out");
}

/// Print the signed-in account.
///
/// # Errors
///
/// Returns [`CliError::NotSignedIn`] for guests.
pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.require_user()?;
    println!("name:      {}", user.display_name());
    println!("role:      {}", user.role);
    if let Some(email) = &user.identity.email {
        println!("email:     {email}");
    }
    if let Some(username) = &user.identity.username {
        println!("username:  {username}");
    }
    if let Some(status) = user.seller_status {
        println!("seller:    {status}");
    }
    println!("namespace: {}", ctx.session.list_key(bazaar_core::ListKind::Cart));
    Ok(())
}

/// Ask for a password-reset code.
///
/// # Errors
///
/// Returns an error if the account is unknown or the request fails.
pub async fn forgot_password(ctx: &Context, identifier: &str) -> Result<(), CliError> {
    let reply = ctx.api().forgot_password(identifier.trim()).await?;
    match reply.masked_email {
        Some(masked) => println!("OTP sent to {masked}"),
        None => println!("OTP sent"),
    }
    Ok(())
}

/// Set a new password with the emailed code.
///
/// # Errors
///
/// Returns an error if the code is rejected.
pub async fn reset_password(
    ctx: &Context,
    identifier: &str,
    code: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), CliError> {
    if new_password.is_empty() {
        return Err(CliError::Usage("New password is required".to_string()));
    }
    if new_password != confirm_password {
        return Err(CliError::Usage("Passwords do not match".to_string()));
    }
    ctx.api()
        .reset_password(identifier.trim(), code.trim(), new_password)
        .await?;
    info!(identifier = %identifier.trim(), "Password reset");
    println!("Password reset. You can sign in now.");
    Ok(())
}
