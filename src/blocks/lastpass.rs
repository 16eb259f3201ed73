//! LastPass session indicator.
//!
//! Shows `LastPass` in good color while `lpass status` reports a logged-in
//! session, in bad color otherwise. Left click on the bad state runs
//! `lpass login <email>` and refreshes once it returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::command::{Command, RunnerRef};
use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{Click, ClickContext, Color, Output, Segment};

/// `lpass login` waits on a pinentry dialog.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

pub struct LastPass {
    runner: RunnerRef,
    email: Arc<str>,
    padding: u32,
}

impl LastPass {
    pub fn new(runner: RunnerRef, email: impl Into<Arc<str>>, padding: u32) -> Self {
        Self {
            runner,
            email: email.into(),
            padding,
        }
    }

    fn login_click(&self) -> Click {
        let runner = Arc::clone(&self.runner);
        let email = Arc::clone(&self.email);
        Click::left(move |ctx: ClickContext| {
            let runner = Arc::clone(&runner);
            let cmd = Command::new("lpass")
                .args(["login", &*email])
                .with_timeout(Some(LOGIN_TIMEOUT));
            async move {
                info!(command = %cmd.display(), "logging in");
                runner.run(&cmd).await?;
                ctx.refresh.now();
                Ok(())
            }
        })
    }
}

#[async_trait]
impl Module for LastPass {
    fn name(&self) -> &str {
        "lastpass"
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        // `lpass status` exits non-zero when logged out; only the text matters.
        let out = self
            .runner
            .run(&Command::shell("lpass status || exit 0"))
            .await?;
        let seg = Segment::new("LastPass").with_padding(self.padding);
        let seg = if out.stdout.contains("Logged in") {
            seg.with_color(Color::Good)
        } else {
            seg.with_color(Color::Bad).with_click(self.login_click())
        };
        Ok(seg.into())
    }
}
