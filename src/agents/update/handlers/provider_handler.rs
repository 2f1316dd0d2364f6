use super::process_declarations;
use crate::agents::declaration::extract_providers;
use crate::agents::update::context::FileContext;
use crate::agents::update::report::Report;
use crate::config::Selector;
use crate::error::Result;
use crate::repository::VersionResolver;

pub const PROVIDER_TITLE: &str = "Provider";

/// Updates the `required_providers` entries of a file.
pub struct ProviderHandler<'a> {
    resolver: &'a dyn VersionResolver,
    selector: Option<&'a Selector>,
}

impl<'a> ProviderHandler<'a> {
    pub fn new(resolver: &'a dyn VersionResolver, selector: Option<&'a Selector>) -> Self {
        Self { resolver, selector }
    }

    pub fn update(&self, ctx: &mut FileContext) -> Result<Report> {
        let declarations = extract_providers(ctx.path(), ctx.body())?;
        let mut report = Report::new(PROVIDER_TITLE);
        process_declarations(ctx, declarations, self.resolver, self.selector, &mut report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::update::handlers::test_support::{run, terraform_file};
    use crate::agents::update::report::IgnoreReason;
    use crate::repository::testing::StaticResolver;

    const BASIC: &str = r#"
terraform {
  required_version = "0.13.5"

  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "2.35.0"
    }
  }
}

provider "azurerm" {}
"#;

    const IGNORED: &str = "
terraform {
  required_version = \"0.13.5\"

  required_providers {
\t\t#tf-latest-version:ignore
    azurerm = {
      source  = \"hashicorp/azurerm\"
\t\t\tversion = \"2.36.0\"
    }
  }
}

provider \"azurerm\" {}
";

    const SELECTOR: &str = r#"
terraform {
  required_version = "0.13.5"

  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "2.76.0"
    }
    aws = {
      source  = "hashicorp/aws"
      version = "3.58.0"
    }
  }
}

provider "azurerm" {}
"#;

    fn azurerm(version: &str) -> StaticResolver {
        StaticResolver::new().with("hashicorp/azurerm", &[version])
    }

    fn update(content: &str, resolver: &StaticResolver, selector: Option<&Selector>) -> (Report, String) {
        let (_dir, path) = terraform_file(content);
        run(&path, |ctx| ProviderHandler::new(resolver, selector).update(ctx))
    }

    #[test]
    fn updates_provider_version() {
        let (report, content) = update(BASIC, &azurerm("2.53.0"), None);
        assert_eq!(report.title, "Provider");
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].name, "hashicorp/azurerm");
        assert_eq!(report.updated[0].old_version, "2.35.0");
        assert_eq!(report.updated[0].new_version, "2.53.0");
        assert_eq!(content, BASIC.replace("2.35.0", "2.53.0"));
    }

    #[test]
    fn realigns_extra_configuration() {
        let input = BASIC.replace(
            "      version = \"2.35.0\"\n",
            "      version = \"2.35.0\"\n      configuration_aliases = [azurerm.foobar]\n",
        );
        let (report, content) = update(&input, &azurerm("2.53.0"), None);
        assert_eq!(report.updated[0].new_version, "2.53.0");
        assert!(content.contains(
            "      source                = \"hashicorp/azurerm\"\n      version               = \"2.53.0\"\n      configuration_aliases = [azurerm.foobar]\n"
        ));
    }

    #[test]
    fn no_required_providers() {
        let input = "\nterraform {\n}\n\nprovider \"aws\" {\n  region = \"eu-west-1\"\n}\n";
        let (report, content) = update(input, &StaticResolver::new(), None);
        assert!(report.is_empty());
        assert_eq!(content, input);
    }

    #[test]
    fn annotated_provider_is_ignored() {
        let (report, content) = update(IGNORED, &azurerm("2.53.0"), None);
        assert!(report.updated.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(report.ignored.len(), 1);
        assert_eq!(report.ignored[0].reason, IgnoreReason::Annotation);
        assert_eq!(content, IGNORED);
    }

    #[test]
    fn other_comments_do_not_ignore() {
        let input = IGNORED.replace("#tf-latest-version:ignore", "#do-not:ignore");
        let (report, _) = update(&input, &azurerm("2.53.0"), None);
        assert_eq!(report.updated.len(), 1);
        assert!(report.ignored.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn unknown_provider_fails_without_aborting() {
        let (report, content) = update(BASIC, &StaticResolver::new(), None);
        assert!(report.updated.is_empty());
        assert!(report.ignored.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("main.tf"));
        assert_eq!(content, BASIC);
    }

    #[test]
    fn failure_does_not_stop_the_next_provider() {
        let resolver = StaticResolver::new().with("hashicorp/aws", &["3.59.0"]);
        let (report, content) = update(SELECTOR, &resolver, None);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "hashicorp/azurerm");
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].name, "hashicorp/aws");
        assert_eq!(content, SELECTOR.replace("3.58.0", "3.59.0"));
    }

    #[test]
    fn selector_limits_updates() {
        let resolver = StaticResolver::new()
            .with("hashicorp/azurerm", &["2.77.0"])
            .with("hashicorp/aws", &["3.59.0"]);
        let selector = Selector::new(["hashicorp/azurerm"]);

        let (report, content) = update(SELECTOR, &resolver, Some(&selector));
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.ignored.len(), 1);
        assert_eq!(report.ignored[0].name, "hashicorp/aws");
        assert_eq!(report.ignored[0].reason, IgnoreReason::NotSelected);
        assert_eq!(content, SELECTOR.replace("2.76.0", "2.77.0"));
    }

    #[test]
    fn second_run_changes_nothing() {
        let (_dir, path) = terraform_file(BASIC);
        let resolver = azurerm("2.53.0");
        let (_, first) = run(&path, |ctx| ProviderHandler::new(&resolver, None).update(ctx));
        let (report, second) = run(&path, |ctx| ProviderHandler::new(&resolver, None).update(ctx));
        assert!(report.is_empty());
        assert_eq!(first, second);
    }
}
