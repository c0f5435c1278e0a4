/// Position of the current article in the participant's fixed reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleNavigator {
    articles: Vec<String>,
    current: Option<usize>,
}

pub fn article_route(article_id: &str) -> String {
    format!("/article/{}", article_id)
}

impl ArticleNavigator {
    /// `current` is the host's index into `articles`. A missing or
    /// out-of-range index leaves the position unknown, which hides both
    /// controls.
    pub fn new(articles: Vec<String>, current: Option<usize>) -> Self {
        let current = current.filter(|i| *i < articles.len());
        Self { articles, current }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_article(&self) -> Option<&str> {
        self.current.map(|i| self.articles[i].as_str())
    }

    pub fn has_prev(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.articles.len())
    }

    pub fn prev_route(&self) -> Option<String> {
        let i = self.current.filter(|_| self.has_prev())?;
        Some(article_route(&self.articles[i - 1]))
    }

    pub fn next_route(&self) -> Option<String> {
        let i = self.current.filter(|_| self.has_next())?;
        Some(article_route(&self.articles[i + 1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(current: Option<usize>) -> ArticleNavigator {
        let articles = ["a1", "a2", "a3"].iter().map(|s| s.to_string()).collect();
        ArticleNavigator::new(articles, current)
    }

    #[test]
    fn test_first_article() {
        let n = nav(Some(0));
        assert!(!n.has_prev());
        assert!(n.has_next());
        assert_eq!(n.prev_route(), None);
        assert_eq!(n.next_route().as_deref(), Some("/article/a2"));
    }

    #[test]
    fn test_middle_article() {
        let n = nav(Some(1));
        assert_eq!(n.prev_route().as_deref(), Some("/article/a1"));
        assert_eq!(n.next_route().as_deref(), Some("/article/a3"));
    }

    #[test]
    fn test_last_article() {
        let n = nav(Some(2));
        assert!(n.has_prev());
        assert!(!n.has_next());
        assert_eq!(n.next_route(), None);
    }

    #[test]
    fn test_unknown_position_hides_both() {
        for n in [nav(None), nav(Some(3))] {
            assert_eq!(n.current_index(), None);
            assert_eq!(n.current_article(), None);
            assert!(!n.has_prev());
            assert!(!n.has_next());
        }
    }

    #[test]
    fn test_repeated_article_uses_host_index() {
        let articles = ["a1", "a2", "a1", "a3"].iter().map(|s| s.to_string()).collect();
        let n = ArticleNavigator::new(articles, Some(2));
        assert_eq!(n.current_article(), Some("a1"));
        assert_eq!(n.prev_route().as_deref(), Some("/article/a2"));
        assert_eq!(n.next_route().as_deref(), Some("/article/a3"));
    }

    #[test]
    fn test_empty_list() {
        let n = ArticleNavigator::new(Vec::new(), Some(0));
        assert!(!n.has_prev());
        assert!(!n.has_next());
    }
}
