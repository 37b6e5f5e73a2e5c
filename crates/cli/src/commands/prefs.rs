//! Route access checks and the theme preference.

use bazaar_client::{GuardDecision, RouteGuard, Theme, Visitor};

use super::{CliError, Context};

fn describe(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Allow => "allow".to_string(),
        GuardDecision::Pending => "pending".to_string(),
        GuardDecision::RedirectToLogin { location } => format!("login -> {location}"),
        GuardDecision::RedirectHome { location } => format!("home -> {location}"),
    }
}

/// Print what the guard does with `path` for the current visitor.
pub fn check_route(ctx: &Context, path: &str) {
    let visitor = Visitor::from(&ctx.session);
    let decision = RouteGuard::default().check(path, visitor);
    println!("{}", describe(&decision));
}

/// Print the stored theme.
pub fn show_theme(ctx: &Context) {
    println!("{}", Theme::load(&*ctx.store));
}

/// Store a theme, or flip the current one when `theme` is `None`.
///
/// # Errors
///
/// Returns an error if the preference cannot be saved.
pub fn set_theme(ctx: &Context, theme: Option<Theme>) -> Result<(), CliError> {
    let theme = theme.unwrap_or_else(|| Theme::load(&*ctx.store).toggled());
    theme.save(&*ctx.store)?;
    println!("{theme}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&GuardDecision::Allow), "allow");
        assert_eq!(
            describe(&GuardDecision::RedirectHome {
                location: "/seller/dashboard"
            }),
            "home -> /seller/dashboard"
        );
        assert_eq!(
            describe(&GuardDecision::RedirectToLogin {
                location: "/login?next=%2Forders".to_string()
            }),
            "login -> /login?next=%2Forders"
        );
    }
}
