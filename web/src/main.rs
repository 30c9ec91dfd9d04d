use dioxus::prelude::*;

use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::views::{Home, Visualizer};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(WebNavbar)]
    #[route("/")]
    Home {},
    #[route("/visualizer")]
    Visualizer {},
}

const FAVICON: Asset = asset!("/assets/favicon.ico");
const MAIN_CSS: Asset = asset!("/assets/main.css");

fn nav_home(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Home {},
        "{label}"
    })
}
fn nav_visualizer(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Visualizer {},
        "{label}"
    })
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    {
        ui::i18n::init();
        // Register localized navigation builder
        register_nav(NavBuilder {
            home: nav_home,
            visualizer: nav_visualizer,
        });
    }

    // Global reactive language code signal; AppNavbar updates it via context
    // when the user switches locale.
    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);

    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        // Keyed wrapper forces a full remount on language change so every
        // view re-pulls localized strings.
        div {
            key: "{lang_code()}",
            div { style: "display:none", "{lang_code()}" }
            Router::<Route> {}
        }
    }
}

/// A web-specific Router around the shared `AppNavbar` component
/// which allows us to use the web-specific `Route` enum.
#[component]
fn WebNavbar() -> Element {
    rsx! {
        AppNavbar { }
        Outlet::<Route> {}
    }
}
