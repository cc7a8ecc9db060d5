//! Generator for Playwright scraper scripts.
//!
//! The generated Python script opens the target page and reads one CSS
//! selector per parameter, returning a `{param: text}` dictionary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where a parameter is found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Parameter name
    pub param: String,
    /// CSS selector
    pub selector: String,
}

impl Mapping {
    /// Creates a mapping.
    pub fn new(param: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            selector: selector.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.param.trim().is_empty() && !self.selector.trim().is_empty()
    }
}

/// Input of the script generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperRequest {
    /// Page to scrape
    pub target_url: String,
    /// Parameter mappings
    #[serde(default)]
    pub mappings: Vec<Mapping>,
}

impl ScraperRequest {
    /// Generates the Python script.
    ///
    /// Mappings with a blank parameter or selector are left out.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the target URL is blank.
    pub fn generate(&self) -> Result<String> {
        if self.target_url.trim().is_empty() {
            return Err(Error::validation_field("targetUrl", "Please enter a target URL"));
        }

        let mut code = String::from("from playwright.sync_api import sync_playwright\n\n");
        code.push_str(&format!("def scrape_parameters(url=\"{}\"):\n", self.target_url));
        code.push_str("    with sync_playwright() as p:\n");
        code.push_str("        browser = p.chromium.launch()\n");
        code.push_str("        page = browser.new_page()\n");
        code.push_str("        page.goto(url)\n\n");
        code.push_str("        parameters = {}\n");

        for Mapping { param, selector } in self.mappings.iter().filter(|m| m.is_complete()) {
            code.push_str(&format!("        \n        # Extract {param}\n"));
            code.push_str("        try:\n");
            code.push_str(&format!(
                "            {param}_element = page.locator(\"{selector}\")\n"
            ));
            code.push_str(&format!(
                "            parameters[\"{param}\"] = {param}_element.inner_text()\n"
            ));
            code.push_str("        except:\n");
            code.push_str(&format!("            parameters[\"{param}\"] = None\n"));
        }

        code.push_str("\n        browser.close()\n");
        code.push_str("        return parameters\n\n");
        code.push_str("# Usage\n");
        code.push_str("# data = scrape_parameters()\n");
        code.push_str("# print(data)");
        Ok(code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_url_rejected() {
        let request = ScraperRequest {
            target_url: "  ".into(),
            mappings: vec![Mapping::new("result", "#r")],
        };
        let err = request.generate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Please enter a target URL");
    }

    #[test]
    fn test_script_without_mappings() {
        let request = ScraperRequest {
            target_url: "https://lab.example/results".into(),
            mappings: vec![],
        };
        let expected = "from playwright.sync_api import sync_playwright\n\n\
def scrape_parameters(url=\"https://lab.example/results\"):\n\
\x20   with sync_playwright() as p:\n\
\x20       browser = p.chromium.launch()\n\
\x20       page = browser.new_page()\n\
\x20       page.goto(url)\n\n\
\x20       parameters = {}\n\
\n\
\x20       browser.close()\n\
\x20       return parameters\n\n\
# Usage\n\
# data = scrape_parameters()\n\
# print(data)";
        assert_eq!(request.generate().unwrap(), expected);
    }

    #[test]
    fn test_extraction_block() {
        let request = ScraperRequest {
            target_url: "https://lab.example".into(),
            mappings: vec![
                Mapping::new("hemoglobine", "#hgb .value"),
                Mapping::new("", "#ignored"),
                Mapping::new("qc", " "),
            ],
        };
        let code = request.generate().unwrap();
        let block = "        \n        # Extract hemoglobine\n\
\x20       try:\n\
\x20           hemoglobine_element = page.locator(\"#hgb .value\")\n\
\x20           parameters[\"hemoglobine\"] = hemoglobine_element.inner_text()\n\
\x20       except:\n\
\x20           parameters[\"hemoglobine\"] = None\n";
        assert!(code.contains(block));
        assert_eq!(code.matches("# Extract").count(), 1);
        assert!(!code.contains("#ignored"));
    }

    #[test]
    fn test_request_json() {
        let request: ScraperRequest = serde_json::from_str(
            r##"{"targetUrl": "https://lab.example", "mappings": [{"param": "qc", "selector": "#qc"}]}"##,
        )
        .unwrap();
        assert_eq!(request.mappings, vec![Mapping::new("qc", "#qc")]);
    }
}
