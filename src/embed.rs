//! Third-party player embedding. The player itself is opaque; all this
//! tracks is whether the iframe came up.

use std::time::Duration;

pub const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

pub fn embed_url(base: &str, movie_id: i32) -> String {
    format!("{}/embed/movie/{movie_id}", base.trim_end_matches('/'))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerState {
    Loading,
    Ready,
    Failed,
}

impl PlayerState {
    /// The name the player page's script uses for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    src: String,
    state: PlayerState,
    mount_key: u32,
    waited: Duration,
    timeout: Duration,
}

impl Player {
    pub fn new(base: &str, movie_id: i32) -> Self {
        Self::with_timeout(base, movie_id, LOAD_TIMEOUT)
    }

    pub fn with_timeout(base: &str, movie_id: i32, timeout: Duration) -> Self {
        Self {
            src: embed_url(base, movie_id),
            state: PlayerState::Loading,
            mount_key: 0,
            waited: Duration::ZERO,
            timeout,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Changes on every retry; the frame must be remounted when it does.
    pub fn mount_key(&self) -> u32 {
        self.mount_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The same URL, opened in a new tab when embedding fails.
    pub fn external_url(&self) -> &str {
        &self.src
    }

    /// The frame's load event.
    pub fn loaded(&mut self) {
        if self.state == PlayerState::Loading {
            self.state = PlayerState::Ready;
        }
    }

    /// The frame's error event.
    pub fn errored(&mut self) {
        if self.state == PlayerState::Loading {
            self.state = PlayerState::Failed;
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if self.state != PlayerState::Loading {
            return;
        }
        self.waited += elapsed;
        if self.waited >= self.timeout {
            self.state = PlayerState::Failed;
        }
    }

    pub fn retry(&mut self) {
        if self.state == PlayerState::Failed {
            self.state = PlayerState::Loading;
            self.waited = Duration::ZERO;
            self.mount_key += 1;
        }
    }
}
