//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{amount::Direction, endpoints, endpoints::format_endpoint};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link {
    url: String,
    title: &'static str,
    is_current: bool,
}

impl Link {
    fn new(url: String, title: &'static str, active_endpoint: &str) -> Self {
        let is_current = url == active_endpoint;

        Self {
            url,
            title,
            is_current,
        }
    }

    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    site_name: &'a str,
    links: Vec<Link>,
}

impl<'a> NavBar<'a> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(site_name: &'a str, active_endpoint: &str) -> Self {
        let links = vec![
            Link::new(endpoints::ROOT.to_owned(), "Hem", active_endpoint),
            Link::new(
                format_endpoint(endpoints::ADD_INVOICE_DIRECTION_VIEW, Direction::In),
                "Ny insättning",
                active_endpoint,
            ),
            Link::new(
                format_endpoint(endpoints::ADD_INVOICE_DIRECTION_VIEW, Direction::Out),
                "Ny utbetalning",
                active_endpoint,
            ),
        ];

        NavBar { site_name, links }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        (self.site_name)
                    }

                    ul
                        class="font-medium flex flex-row space-x-4 lg:space-x-8 p-0
                        rtl:space-x-reverse dark:bg-gray-900"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use std::collections::HashMap;

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let mut cases = HashMap::new();
        cases.insert(endpoints::ROOT, true);
        cases.insert("/add/in", true);
        cases.insert("/add/out", true);

        cases.insert(endpoints::ADD_INVOICE_VIEW, false);
        cases.insert(endpoints::INVOICES, false);
        cases.insert(endpoints::PERIODS, false);

        for (endpoint, should_be_active) in cases {
            let nav_bar = NavBar::new("Test", endpoint);

            assert_link_active(nav_bar, endpoint, should_be_active);
        }
    }

    #[test]
    fn shows_site_name() {
        let html = NavBar::new("Förenklat bokslut", endpoints::ROOT)
            .into_html()
            .into_string();

        assert!(html.contains("Förenklat bokslut"));
    }

    #[track_caller]
    fn assert_link_active(nav_bar: NavBar<'_>, endpoint: &str, should_be_active: bool) {
        let get_active_string = |is_active: bool| -> &str {
            if is_active {
                "active (true)"
            } else {
                "inactive (false)"
            }
        };

        for link in nav_bar.links {
            if link.url == endpoint {
                assert_eq!(
                    link.is_current,
                    should_be_active,
                    "Link for current page should be {} but got {}",
                    get_active_string(should_be_active),
                    get_active_string(link.is_current),
                )
            } else {
                assert!(
                    !link.is_current,
                    "Link for inactive page should {} but got {}",
                    get_active_string(false),
                    get_active_string(link.is_current)
                )
            }
        }
    }
}
