use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    Login,
    Register,
    CompleteProfile,
    Emergency,
}

impl Page {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "index.html",
            Self::Login => "login.html",
            Self::Register => "registro.html",
            Self::CompleteProfile => "completar-perfil.html",
            Self::Emergency => "emergencia.html",
        }
    }

    /// Pages that redirect visitors without a session to the login page.
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::CompleteProfile | Self::Emergency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum NavigationOperation {
    Navigate { page: Page },
}

impl Operation for NavigationOperation {
    type Output = ();
}

pub struct Navigation<E> {
    context: CapabilityContext<NavigationOperation, E>,
}

impl<Ev> Capability<Ev> for Navigation<Ev> {
    type Operation = NavigationOperation;
    type MappedSelf<MappedEv> = Navigation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigation::new(self.context.map_event(f))
    }
}

impl<E> Navigation<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, E>) -> Self {
        Self { context }
    }

    /// Fire-and-forget; the page is replaced, so no event comes back.
    pub fn navigate(&self, page: Page) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(NavigationOperation::Navigate { page }).await;
        });
    }
}
