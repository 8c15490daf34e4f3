#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    TaskBoard,
}

impl Route {
    pub fn to_path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::TaskBoard => "/",
        }
    }

    pub fn from_path(path: &str) -> Self {
        match path {
            "/login" => Route::Login,
            "/register" => Route::Register,
            _ => Route::TaskBoard,
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::TaskBoard)
    }

    /// Pages that make no sense once logged in.
    pub fn requires_guest(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

/// Where navigation to `target` actually lands.
pub fn guard(target: Route, is_logged_in: bool) -> Route {
    if target.requires_auth() && !is_logged_in {
        Route::Login
    } else if target.requires_guest() && is_logged_in {
        Route::TaskBoard
    } else {
        target
    }
}
