//! Login and logout handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use secrecy::SecretString;

use prepwise_core::UserProfile;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

fn user_detail(user: &UserProfile) -> String {
    [
        format!("Name:        {}", user.name),
        format!("Email:       {}", user.email),
        format!("Role:        {}", user.role),
        format!(
            "Institution: {}",
            user.institution.as_deref().unwrap_or("-")
        ),
    ]
    .join("\n")
}

fn read_email(arg: Option<String>) -> Result<String, CliError> {
    let email = match arg {
        Some(email) => email,
        None => {
            if !std::io::stdin().is_terminal() {
                return Err(CliError::validation(
                    "email",
                    "pass --email when not running in a terminal",
                ));
            }
            Input::new()
                .with_prompt("Email")
                .interact_text()
                .map_err(util::prompt_err)?
        }
    };
    let email = email.trim().to_owned();
    if email.is_empty() {
        return Err(CliError::validation("email", "email cannot be empty"));
    }
    Ok(email)
}

fn read_password(env_var: &str) -> Result<SecretString, CliError> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::validation(
            "password",
            format!("set {env_var} when not running in a terminal"),
        ));
    }
    let password = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
    if password.is_empty() {
        return Err(CliError::validation("password", "password cannot be empty"));
    }
    Ok(SecretString::from(password))
}

pub async fn login(ctx: &Context, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = read_email(args.email)?;
    let password = read_password(&args.password_env)?;

    let session = ctx.portal.login(&email, &password).await?;
    let path = ctx.profile.sessions().save(&session, args.remember)?;

    output::note(
        &format!("Logged in as {} ({})", session.user.name, session.user.role),
        global.quiet,
    );
    if args.remember {
        output::note(&format!("Session remembered in {}", path.display()), global.quiet);
    } else {
        tracing::debug!(path = %path.display(), "session kept until restart");
    }

    let out = output::render_single(&global.output, &session.user, user_detail, |u| {
        u.email.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn logout(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let was_logged_in = ctx.portal.session().is_some();
    ctx.portal.logout().await;
    ctx.profile.sessions().clear()?;
    let message = if was_logged_in {
        "Logged out."
    } else {
        "No active session."
    };
    output::note(message, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prepwise_core::Role;

    #[test]
    fn email_argument_is_trimmed() {
        assert_eq!(
            read_email(Some("  asha@school.in ".into())).unwrap(),
            "asha@school.in"
        );
        assert!(read_email(Some("   ".into())).is_err());
    }

    #[test]
    fn user_detail_shows_role() {
        let user = UserProfile {
            id: None,
            name: "Asha".into(),
            email: "asha@school.in".into(),
            role: Role::Teacher,
            institution: None,
        };
        let text = user_detail(&user);
        assert!(text.contains("Role:        teacher"));
        assert!(text.contains("Institution: -"));
    }
}
