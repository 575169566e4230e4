//! The navigation bar shared by all logged-in pages.

use maud::{Markup, html};
use time::OffsetDateTime;

use crate::endpoints;

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to `true`. Only one link
/// should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: String,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent \
            lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
            lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 \
            dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 \
            dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!( li { a href=(self.url) class=(style) { (self.title) } } )
    }
}

/// The navigation bar listing the app's main pages.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be marked as
    /// active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let current_year = OffsetDateTime::now_utc().year();
        let report_url =
            endpoints::ANNUAL_REPORT_VIEW.replace("{year}", &current_year.to_string());

        let links = vec![
            Link {
                url: endpoints::DASHBOARD_VIEW.to_owned(),
                title: "Dashboard",
                is_current: active_endpoint == endpoints::DASHBOARD_VIEW,
            },
            Link {
                url: endpoints::RULES_VIEW.to_owned(),
                title: "Fixos",
                is_current: active_endpoint == endpoints::RULES_VIEW,
            },
            Link {
                url: endpoints::GOALS_VIEW.to_owned(),
                title: "Metas",
                is_current: active_endpoint == endpoints::GOALS_VIEW,
            },
            Link {
                url: report_url,
                title: "Relatório",
                is_current: active_endpoint == endpoints::ANNUAL_REPORT_VIEW,
            },
        ];

        NavBar { links }
    }

    /// Render the navigation bar.
    pub fn into_html(self) -> Markup {
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-800 mb-4"
            {
                div class="max-w-screen-lg flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Contas"
                    }

                    ul class="font-medium flex flex-row space-x-6 rtl:space-x-reverse items-center"
                    {
                        @for link in self.links {
                            (link.into_html())
                        }

                        li
                        {
                            a
                                href=(endpoints::LOG_OUT)
                                class="block py-2 px-3 text-gray-500 hover:text-gray-900 \
                                    dark:text-gray-400 dark:hover:text-white lg:p-0"
                            {
                                "Sair"
                            }
                        }
                    }
                }
            }
        }
    }
}
