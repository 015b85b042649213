//! URL parameter helpers for task pane and dialog URLs.

use contracts::weblayout::UrlParameter;

/// Map context appended to URLs opened by commands.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub map_name: &'a str,
    pub session: &'a str,
    pub locale: &'a str,
}

/// Appends the map name, session and locale parameters to `url` unless the
/// URL already carries them, followed by `extra` parameters.
///
/// Existing keys are matched case-insensitively. `uppercase` selects
/// `MAPNAME`/`SESSION`/`LOCALE` over the lowercase spelling.
pub fn ensure_parameters(
    url: &str,
    ctx: MapContext<'_>,
    uppercase: bool,
    extra: &[UrlParameter],
) -> String {
    let existing: Vec<String> = url
        .split_once('?')
        .map(|(_, q)| {
            q.split('&')
                .filter(|p| !p.is_empty())
                .map(|p| p.split('=').next().unwrap_or_default().to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default();

    let key = |k: &str| {
        if uppercase {
            k.to_ascii_uppercase()
        } else {
            k.to_string()
        }
    };
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (name, value) in [
        ("mapname", ctx.map_name),
        ("session", ctx.session),
        ("locale", ctx.locale),
    ] {
        if !existing.iter().any(|e| e == name) {
            pairs.push((key(name), value.to_string()));
        }
    }
    pairs.extend(extra.iter().map(|p| (p.name.clone(), p.value.clone())));

    let mut out = url.to_string();
    let mut has_query = url.contains('?');
    for (k, v) in pairs {
        out.push(if has_query { '&' } else { '?' });
        has_query = true;
        out.push_str(&k);
        out.push('=');
        out.push_str(&encode_uri_component(&v));
    }
    out
}

/// Percent-encodes a query value.
pub fn encode_uri_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: MapContext<'static> = MapContext {
        map_name: "Sheboygan_a1",
        session: "s-1",
        locale: "en",
    };

    #[test]
    fn appends_missing_parameters() {
        assert_eq!(
            ensure_parameters("server/TaskPane.html", CTX, true, &[]),
            "server/TaskPane.html?MAPNAME=Sheboygan_a1&SESSION=s-1&LOCALE=en"
        );
        assert_eq!(
            ensure_parameters("search.php", CTX, false, &[]),
            "search.php?mapname=Sheboygan_a1&session=s-1&locale=en"
        );
    }

    #[test]
    fn keeps_existing_parameters_and_adds_extras() {
        let extra = [UrlParameter {
            name: "FORMAT".into(),
            value: "pdf file".into(),
        }];
        assert_eq!(
            ensure_parameters("http://x/report.php?Session=abc", CTX, true, &extra),
            "http://x/report.php?Session=abc&MAPNAME=Sheboygan_a1&LOCALE=en&FORMAT=pdf%20file"
        );
    }
}
