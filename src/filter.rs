use crate::issue::Issue;

use qstring::QString;

/// Attributes an issue list can be filtered by, using their json keys.
///
/// Older clients used to send `status_test` which is not an attribute of an issue. Keys not in this
/// list, including `status_test`, are ignored.
pub(crate) const FILTER_ATTRIBUTES: [&str; 9] = [
    "issue_title",
    "issue_text",
    "created_on",
    "updated_on",
    "created_by",
    "assigned_to",
    "open",
    "status_text",
    "_id"
];

/// Equality filter applied to the issues of a project.
///
/// Values are compared as strings: an issue matches if for every attribute of the filter, its value
/// [formatted as string](Issue::attribute) equals the filter value exactly. Booleans are formatted as
/// `true` and `false`. An empty filter matches every issue.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Filter {
    conditions: Vec<(&'static str, String)>,
}

impl Filter {
    /// Builds a filter out of the query string of a request, picking the first value of every
    /// [filter attribute](FILTER_ATTRIBUTES).
    pub(crate) fn from_query(query: &QString) -> Filter {
        let conditions = FILTER_ATTRIBUTES
            .iter()
            .filter_map(|attribute| query.get(attribute).map(|value| (*attribute, value.to_owned())))
            .collect();

        Filter { conditions }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn matches(&self, issue: &Issue) -> bool {
        self.conditions.iter().all(|(attribute, expected)| {
            issue.attribute(attribute).map_or(false, |value| &value == expected)
        })
    }

    pub(crate) fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if self.is_empty() {
            return issues;
        }

        issues.into_iter().filter(|issue| self.matches(issue)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::issue::NewIssue;
    use crate::utils::object_id::ObjectId;

    fn issue(title: &str, created_by: &str, open: bool) -> Issue {
        let mut issue = NewIssue {
            project: "apitest".to_owned(),
            issue_title: title.to_owned(),
            issue_text: "text".to_owned(),
            created_by: created_by.to_owned(),
            assigned_to: String::new(),
            status_text: "In QA".to_owned(),
            created_on: "2023-09-08T15:29:08.176Z".to_owned(),
        }.into_issue(ObjectId::new());

        issue.open = open;
        issue
    }

    fn titles(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.issue_title.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let issues = vec![issue("a", "Joe", true), issue("b", "Ann", false)];
        let filter = Filter::from_query(&QString::from(""));

        assert!(filter.is_empty());
        assert_eq!(titles(&filter.apply(issues)), vec!["a", "b"]);
    }

    #[test]
    fn filters_are_combined_with_and() {
        let issues = vec![issue("a", "Joe", true), issue("b", "Joe", false), issue("c", "Ann", true)];

        let by_joe = Filter::from_query(&QString::from("created_by=Joe"));
        assert_eq!(titles(&by_joe.apply(issues.clone())), vec!["a", "b"]);

        let open = Filter::from_query(&QString::from("open=true"));
        assert_eq!(titles(&open.apply(issues.clone())), vec!["a", "c"]);

        let both = Filter::from_query(&QString::from("created_by=Joe&open=true"));
        assert_eq!(titles(&both.apply(issues)), vec!["a"]);
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let issues = vec![issue("a", "Joe", true), issue("b", "Ann", false)];
        let filter = Filter::from_query(&QString::from("status_test=whatever&project=other&__v=0"));

        assert!(filter.is_empty());
        assert_eq!(filter.apply(issues).len(), 2);
    }

    #[test]
    fn status_text_and_id_can_be_filtered() {
        let first = issue("a", "Joe", true);
        let issues = vec![first.clone(), issue("b", "Ann", false)];

        let by_id = Filter::from_query(&QString::from(format!("_id={}", first.id).as_str()));
        assert_eq!(titles(&by_id.apply(issues.clone())), vec!["a"]);

        let by_status = Filter::from_query(&QString::from("status_text=In%20QA"));
        assert_eq!(by_status.apply(issues.clone()).len(), 2);

        let no_match = Filter::from_query(&QString::from("status_text=Done"));
        assert!(no_match.apply(issues).is_empty());
    }
}
