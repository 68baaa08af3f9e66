use regex::Regex;

/// Ordered first-match-wins pattern list.
///
/// Rules are tried left to right and evaluation stops at the first rule that
/// matches anywhere in the haystack, even when a later rule would produce a
/// more specific match.
#[derive(Debug)]
pub struct RuleList {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    name: String,
    re: Regex,
}

/// Which rule fired and the first substring it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'r, 'h> {
    pub rule: &'r str,
    pub text: &'h str,
}

impl RuleList {
    pub fn compile(rules: Vec<(String, String)>) -> Result<Self, regex::Error> {
        let rules = rules
            .into_iter()
            .map(|(name, pattern)| Ok(Rule { name, re: Regex::new(&pattern)? }))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(RuleList { rules })
    }

    pub fn first_match<'r, 'h>(&'r self, haystack: &'h str) -> Option<RuleMatch<'r, 'h>> {
        self.rules.iter().find_map(|rule| {
            rule.re.find(haystack).map(|m| RuleMatch {
                rule: rule.name.as_str(),
                text: m.as_str(),
            })
        })
    }

    /// Every match of every rule, rule order first, then position.
    pub fn all_matches<'h>(&self, haystack: &'h str) -> Vec<&'h str> {
        self.rules
            .iter()
            .flat_map(|rule| rule.re.find_iter(haystack).map(|m| m.as_str()))
            .collect()
    }
}
