//! Sandbox rules for hand-written client SDKs

use once_cell::sync::Lazy;
use regex::Regex;

use super::{CheckOutcome, ClientDescriptor, ConformanceRule, MethodDescriptor};

/// HTTP/RPC libraries that are unavailable in the sandbox
pub const FORBIDDEN_IMPORTS: &[&str] = &["requests", "httpx", "http.client", "aiohttp", "grpc"];

/// Modules a client may import (besides its own package)
pub const ALLOWED_IMPORTS: &[&str] = &[
    "urllib.request",
    "urllib.error",
    "urllib.parse",
    "json",
    "base64",
    "io",
    "os",
    "time",
    "math",
    "numpy",
    "cv2",
];

static URL_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[A-Za-z0-9.\-]+(:\d{1,5})?(/\S*)?$").unwrap());

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:>>>\s*)?(?:from\s+[\w.]+\s+import\s+\S+|import\s+[\w.]+)").unwrap()
});

static EXAMPLE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:>>>\s*)?(?:[\w.]+\s*=\s*)?[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*\(.*\)\s*$")
        .unwrap()
});

/// Input kinds an image parameter must accept, with the wording that
/// documents each one
static IMAGE_INPUT_KINDS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("bytes", Regex::new(r"(?i)\bbytes\b").unwrap()),
        (
            "file path",
            Regex::new(r"(?i)\b(file[\s_-]?path|path|filename)\b").unwrap(),
        ),
        (
            "numpy array",
            Regex::new(r"(?i)(\bnumpy\b|\bnp\.ndarray\b|\bndarray\b)").unwrap(),
        ),
        ("base64 string", Regex::new(r"(?i)\bbase64\b").unwrap()),
    ]
});

/// `import` names `module` itself or one of its submodules
fn imports_module(import: &str, module: &str) -> bool {
    import == module
        || import
            .strip_prefix(module)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Rule: no blocked HTTP/RPC client libraries
pub struct ForbiddenImportsRule;

impl ConformanceRule for ForbiddenImportsRule {
    fn check_name(&self) -> &'static str {
        "forbidden-imports"
    }

    fn description(&self) -> &'static str {
        "Client must not import requests, httpx, http.client, aiohttp or grpc"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let offending: Vec<&str> = descriptor
            .imports
            .iter()
            .map(|i| i.trim())
            .filter(|i| FORBIDDEN_IMPORTS.iter().any(|f| imports_module(i, f)))
            .collect();

        if offending.is_empty() {
            CheckOutcome::pass(self.check_name(), "no forbidden imports")
        } else {
            CheckOutcome::fail(
                self.check_name(),
                format!("forbidden imports: {}", offending.join(", ")),
            )
        }
    }
}

/// Rule: every import is on the allow-list or part of the module itself
pub struct AllowedImportsOnlyRule;

impl AllowedImportsOnlyRule {
    fn is_own(descriptor: &ClientDescriptor, import: &str) -> bool {
        // relative import within the package
        if import.starts_with('.') {
            return true;
        }
        if !descriptor.module.is_empty() && imports_module(import, &descriptor.module) {
            return true;
        }
        descriptor.declared_types.iter().any(|t| t == import)
    }
}

impl ConformanceRule for AllowedImportsOnlyRule {
    fn check_name(&self) -> &'static str {
        "allowed-imports-only"
    }

    fn description(&self) -> &'static str {
        "Client may only import stdlib urllib/json/base64/io/os/time/math, numpy, cv2 and its own types"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let outside: Vec<&str> = descriptor
            .imports
            .iter()
            .map(|i| i.trim())
            .filter(|i| {
                !ALLOWED_IMPORTS.iter().any(|a| imports_module(i, a)) && !Self::is_own(descriptor, i)
            })
            .collect();

        if outside.is_empty() {
            CheckOutcome::pass(
                self.check_name(),
                format!("{} imports, all allowed", descriptor.imports.len()),
            )
        } else {
            CheckOutcome::fail(
                self.check_name(),
                format!("imports outside the allow-list: {}", outside.join(", ")),
            )
        }
    }
}

/// Rule: constructor takes `host` with a URL default
pub struct ConstructorHostParamRule;

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

impl ConformanceRule for ConstructorHostParamRule {
    fn check_name(&self) -> &'static str {
        "constructor-host-param"
    }

    fn description(&self) -> &'static str {
        "Constructor must declare host with a URL default"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let Some(params) = &descriptor.constructor else {
            return CheckOutcome::fail(self.check_name(), "no constructor declared");
        };
        let Some(host) = params.iter().find(|p| p.name == "host") else {
            return CheckOutcome::fail(self.check_name(), "constructor has no host parameter");
        };
        let Some(default) = host.default.as_deref() else {
            return CheckOutcome::fail(self.check_name(), "host parameter has no default");
        };

        let url = strip_quotes(default);
        if URL_DEFAULT.is_match(url) {
            CheckOutcome::pass(self.check_name(), format!("host defaults to {url}"))
        } else {
            CheckOutcome::fail(
                self.check_name(),
                format!("host default is not a URL: {default}"),
            )
        }
    }
}

/// Rule: `health()` callable without arguments
pub struct HealthMethodRule;

impl ConformanceRule for HealthMethodRule {
    fn check_name(&self) -> &'static str {
        "has-health-method"
    }

    fn description(&self) -> &'static str {
        "Client must expose health() with no required arguments"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let Some(method) = descriptor.method("health") else {
            return CheckOutcome::fail(self.check_name(), "no health method");
        };

        let required: Vec<&str> = method
            .params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        if required.is_empty() {
            CheckOutcome::pass(self.check_name(), "health() found")
        } else {
            CheckOutcome::fail(
                self.check_name(),
                format!("health() requires arguments: {}", required.join(", ")),
            )
        }
    }
}

/// Rule: image parameters accept bytes, path, ndarray and base64
pub struct ImageInputPolymorphismRule;

impl ImageInputPolymorphismRule {
    fn is_image_param(name: &str) -> bool {
        matches!(name, "image" | "img" | "frame") || name.ends_with("_image")
    }

    fn accepts_image(method: &MethodDescriptor) -> bool {
        method.params.iter().any(|p| Self::is_image_param(&p.name))
    }

    fn undocumented_kinds(method: &MethodDescriptor) -> Vec<&'static str> {
        let doc = method.docstring.as_deref().unwrap_or_default();
        IMAGE_INPUT_KINDS
            .iter()
            .filter(|(_, pattern)| !pattern.is_match(doc))
            .map(|(kind, _)| *kind)
            .collect()
    }
}

impl ConformanceRule for ImageInputPolymorphismRule {
    fn check_name(&self) -> &'static str {
        "image-input-polymorphism"
    }

    fn description(&self) -> &'static str {
        "Image parameters must accept bytes, file path, numpy array and base64 string"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let image_methods: Vec<&MethodDescriptor> = descriptor
            .methods
            .iter()
            .filter(|m| Self::accepts_image(m))
            .collect();

        if image_methods.is_empty() {
            return CheckOutcome::pass(self.check_name(), "no image-accepting methods");
        }

        let problems: Vec<String> = image_methods
            .iter()
            .filter_map(|m| {
                let missing = Self::undocumented_kinds(m);
                (!missing.is_empty())
                    .then(|| format!("{}() does not document {}", m.name, missing.join(", ")))
            })
            .collect();

        if problems.is_empty() {
            CheckOutcome::pass(
                self.check_name(),
                format!("{} image-accepting methods documented", image_methods.len()),
            )
        } else {
            CheckOutcome::fail(self.check_name(), problems.join("; "))
        }
    }
}

/// Rule: module description shows an import and an example call
pub struct ModuleDocstringUsageRule;

impl ConformanceRule for ModuleDocstringUsageRule {
    fn check_name(&self) -> &'static str {
        "module-docstring-usage"
    }

    fn description(&self) -> &'static str {
        "Module docstring must contain an import line and an example call"
    }

    fn evaluate(&self, descriptor: &ClientDescriptor) -> CheckOutcome {
        let doc = descriptor.docstring.as_deref().unwrap_or_default();
        if doc.trim().is_empty() {
            return CheckOutcome::fail(self.check_name(), "no module docstring");
        }

        let has_import = IMPORT_LINE.is_match(doc);
        let has_call = doc
            .lines()
            .any(|line| !IMPORT_LINE.is_match(line) && EXAMPLE_CALL.is_match(line));

        match (has_import, has_call) {
            (true, true) => CheckOutcome::pass(self.check_name(), "usage documented"),
            (false, true) => CheckOutcome::fail(self.check_name(), "docstring has no import line"),
            (true, false) => CheckOutcome::fail(self.check_name(), "docstring has no example call"),
            (false, false) => CheckOutcome::fail(
                self.check_name(),
                "docstring has neither an import line nor an example call",
            ),
        }
    }
}
