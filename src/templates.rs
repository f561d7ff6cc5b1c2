use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    embed::{Player, PlayerState},
    images::{self, DEFAULT_BACKDROP_SIZE},
    models::MovieDetails,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

// Mirrors `embed::Player`: load → ready, error or timeout → failed, and retry
// (only from failed) bumps the mount key and remounts the frame.
const PLAYER_SCRIPT: &str = r#"
(function () {
  const root = document.getElementById('player');
  const timeoutMs = Number(root.dataset.timeoutMs);
  const spinner = document.getElementById('player-loading');
  const failed = document.getElementById('player-failed');
  let timer;

  function setState(state) {
    root.dataset.state = state;
    spinner.classList.toggle('hidden', state !== 'loading');
    failed.classList.toggle('hidden', state !== 'failed');
  }

  function mount() {
    const old = root.querySelector('iframe');
    const frame = document.createElement('iframe');
    frame.src = root.dataset.src;
    frame.dataset.mountKey = root.dataset.mountKey;
    frame.className = 'absolute inset-0 w-full h-full invisible';
    frame.allow = 'autoplay; fullscreen; picture-in-picture';
    frame.allowFullscreen = true;
    frame.addEventListener('load', ready);
    frame.addEventListener('error', fail);
    if (old) old.remove();
    setState('loading');
    root.appendChild(frame);
    clearTimeout(timer);
    timer = setTimeout(fail, timeoutMs);
  }

  function ready() {
    if (root.dataset.state !== 'loading') return;
    clearTimeout(timer);
    setState('ready');
    root.querySelector('iframe').classList.remove('invisible');
  }

  function fail() {
    if (root.dataset.state !== 'loading') return;
    clearTimeout(timer);
    setState('failed');
  }

  function retry() {
    if (root.dataset.state !== 'failed') return;
    root.dataset.mountKey = String(Number(root.dataset.mountKey) + 1);
    mount();
  }

  document.getElementById('player-retry').addEventListener('click', retry);
  if (root.dataset.state === 'loading') mount();
})();
"#;

pub fn player_page(movie: &MovieDetails, player: &Player, image_base: &str) -> String {
    let backdrop =
        images::backdrop_url(image_base, movie.backdrop_path.as_deref(), DEFAULT_BACKDROP_SIZE);
    let year = images::year_of(movie.release_date.as_deref());
    let state = player.state();

    page(
        &movie.title,
        html! {
            div class="min-h-screen bg-black bg-cover bg-center" style=(format!("background-image: linear-gradient(rgba(0,0,0,.85), rgba(0,0,0,.95)), url('{backdrop}')")) {
                div class="max-w-5xl mx-auto px-6 py-10" {
                    h1 class="text-3xl font-bold text-white" {
                        (movie.title)
                        @if let Some(year) = year {
                            span class="ml-2 font-normal text-gray-400" { "(" (year) ")" }
                        }
                    }
                    @if let Some(runtime) = movie.runtime {
                        p class="mt-1 text-sm text-gray-400" { (images::format_runtime(runtime)) }
                    }

                    div id="player" class="relative mt-6 w-full pb-[56.25%] h-0 bg-gray-900 rounded-lg overflow-hidden"
                        data-src=(player.src())
                        data-state=(state.as_str())
                        data-mount-key=(player.mount_key().to_string())
                        data-timeout-ms=(player.timeout().as_millis().to_string()) {
                        div id="player-loading" class=(overlay("flex items-center justify-center", state == PlayerState::Loading)) {
                            div class="h-12 w-12 rounded-full border-4 border-red-200 border-t-red-600 animate-spin" {}
                        }
                        div id="player-failed" class=(overlay("flex flex-col items-center justify-center gap-4 text-center", state == PlayerState::Failed)) {
                            p class="text-white" { "The player failed to load." }
                            div class="flex gap-3" {
                                button id="player-retry" class="rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700" type="button" { "Retry" }
                                a class="rounded-md border border-gray-500 px-4 py-2 text-white hover:bg-gray-800" href=(player.external_url()) target="_blank" rel="noopener noreferrer" {
                                    "Open in new tab"
                                }
                            }
                        }
                    }

                    @if let Some(overview) = &movie.overview {
                        p class="mt-6 text-gray-300" { (overview) }
                    }
                }
            }
            script { (PreEscaped(PLAYER_SCRIPT)) }
        },
    )
}

fn overlay(layout: &str, visible: bool) -> String {
    if visible {
        format!("absolute inset-0 {layout}")
    } else {
        format!("hidden absolute inset-0 {layout}")
    }
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-black flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-gray-900 shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-white" { "Error" }
                        p class="mt-4 text-gray-300" { (message) }
                        a class="mt-6 inline-block text-red-500 hover:text-red-400" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_page_embeds_frame_source_and_fallback() {
        let movie = MovieDetails {
            id: 550,
            title: "Fight Club".into(),
            release_date: Some("1999-10-15".into()),
            runtime: Some(139),
            ..Default::default()
        };
        let player = Player::new("https://vidsrc.to", 550);
        let html = player_page(&movie, &player, "https://image.tmdb.org/t/p");

        assert!(html.contains(r#"data-src="https://vidsrc.to/embed/movie/550""#));
        assert!(html.contains(r#"data-timeout-ms="15000""#));
        assert!(html.contains(r#"href="https://vidsrc.to/embed/movie/550""#));
        assert!(html.contains("(1999)"));
        assert!(html.contains("2h 19m"));
    }

    #[test]
    fn page_reflects_player_state() {
        let movie = MovieDetails { id: 550, title: "Fight Club".into(), ..Default::default() };
        let mut player = Player::new("https://vidsrc.to", 550);

        let html = player_page(&movie, &player, "");
        assert!(html.contains(r#"data-state="loading""#));
        assert!(html.contains(r#"data-mount-key="0""#));
        assert!(html.contains(r#"id="player-loading" class="absolute"#));
        assert!(html.contains(r#"id="player-failed" class="hidden"#));

        player.errored();
        let html = player_page(&movie, &player, "");
        assert!(html.contains(r#"data-state="failed""#));
        assert!(html.contains(r#"id="player-loading" class="hidden"#));
        assert!(html.contains(r#"id="player-failed" class="absolute"#));

        player.retry();
        let html = player_page(&movie, &player, "");
        assert!(html.contains(r#"data-state="loading""#));
        assert!(html.contains(r#"data-mount-key="1""#));
    }

    #[test]
    fn titles_are_escaped() {
        let movie = MovieDetails { id: 1, title: "<script>".into(), ..Default::default() };
        let html = player_page(&movie, &Player::new("https://vidsrc.to", 1), "");
        assert!(!html.contains("<title><script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
