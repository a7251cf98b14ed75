//! Resolving the period the user is currently looking at.
//!
//! The selection is kept client-side in the `current_period` cookie and is
//! checked against the stored periods on every request.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::period::Period;

pub const CURRENT_PERIOD_COOKIE: &str = "current_period";

/// Pick the current period and re-issue the cookie for it.
///
/// `requested` (e.g. from a query parameter) takes precedence over the cookie.
/// If neither names one of `periods`, the period with the lexicographically
/// last name is used.
///
/// Returns `None` only if `periods` is empty.
pub fn resolve_current_period(
    jar: CookieJar,
    requested: Option<&str>,
    periods: &[Period],
) -> (CookieJar, Option<String>) {
    let exists = |name: &str| periods.iter().any(|period| period.name == name);

    let selected = requested
        .filter(|name| exists(name))
        .map(str::to_owned)
        .or_else(|| {
            jar.get(CURRENT_PERIOD_COOKIE)
                .map(|cookie| cookie.value().to_owned())
                .filter(|name| exists(name))
        })
        .or_else(|| periods.iter().map(|period| &period.name).max().cloned());

    match selected {
        Some(name) => (set_current_period(jar, &name), Some(name)),
        None => (jar, None),
    }
}

/// Remember `name` as the current period.
pub fn set_current_period(jar: CookieJar, name: &str) -> CookieJar {
    jar.add(
        Cookie::build((CURRENT_PERIOD_COOKIE, name.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Forget the current period.
pub fn clear_current_period(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(CURRENT_PERIOD_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{CookieJar, cookie::Cookie};

    use crate::period::Period;

    use super::{
        CURRENT_PERIOD_COOKIE, clear_current_period, resolve_current_period, set_current_period,
    };

    fn periods(names: &[&str]) -> Vec<Period> {
        names
            .iter()
            .map(|name| Period {
                name: (*name).to_owned(),
                opening_balance: None,
                closing_balance: None,
                notes: None,
            })
            .collect()
    }

    fn cookie_value(jar: &CookieJar) -> Option<String> {
        jar.get(CURRENT_PERIOD_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    }

    #[test]
    fn uses_cookie_when_period_exists() {
        let jar = CookieJar::new().add(Cookie::new(CURRENT_PERIOD_COOKIE, "2023"));

        let (jar, current) = resolve_current_period(jar, None, &periods(&["2023", "2024"]));

        assert_eq!(current.as_deref(), Some("2023"));
        assert_eq!(cookie_value(&jar).as_deref(), Some("2023"));
    }

    #[test]
    fn falls_back_to_last_name_for_unknown_cookie() {
        let jar = CookieJar::new().add(Cookie::new(CURRENT_PERIOD_COOKIE, "borttagen"));

        let (jar, current) = resolve_current_period(jar, None, &periods(&["2024", "2022", "2023"]));

        assert_eq!(current.as_deref(), Some("2024"));
        assert_eq!(cookie_value(&jar).as_deref(), Some("2024"));
    }

    #[test]
    fn falls_back_to_last_name_without_cookie() {
        let (_, current) = resolve_current_period(CookieJar::new(), None, &periods(&["A", "B"]));

        assert_eq!(current.as_deref(), Some("B"));
    }

    #[test]
    fn requested_period_wins_over_cookie() {
        let jar = CookieJar::new().add(Cookie::new(CURRENT_PERIOD_COOKIE, "2023"));

        let (jar, current) =
            resolve_current_period(jar, Some("2022"), &periods(&["2022", "2023", "2024"]));

        assert_eq!(current.as_deref(), Some("2022"));
        assert_eq!(cookie_value(&jar).as_deref(), Some("2022"));
    }

    #[test]
    fn unknown_requested_period_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(CURRENT_PERIOD_COOKIE, "2023"));

        let (_, current) = resolve_current_period(jar, Some("1999"), &periods(&["2023", "2024"]));

        assert_eq!(current.as_deref(), Some("2023"));
    }

    #[test]
    fn no_periods_gives_none() {
        let (_, current) = resolve_current_period(CookieJar::new(), None, &[]);

        assert_eq!(current, None);
    }

    #[test]
    fn clear_removes_cookie() {
        let jar = set_current_period(CookieJar::new(), "2024");

        let jar = clear_current_period(jar);

        assert_eq!(cookie_value(&jar), None);
    }
}
