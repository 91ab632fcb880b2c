use std::collections::HashSet;

/// Posting applications operated by people rather than bots.
///
/// Spellings are exact, including the doubled spaces and the Greek omicron in
/// `"Tweetbot for iΟS"` found in the collected data.
pub const DEFAULT_CLIENTS: &[&str] = &[
    "Carbon v2",
    "Corebird",
    "Echofon",
    "Echofon Android",
    "Echofon  Android",
    "Echofon for Android PRO",
    "Fenix for Android",
    "Flamingo for Android",
    "Instagram",
    "Janetter",
    "MetroTwit",
    "MeTweets for Windows Phone",
    "Mobile Web (M2)",
    "Mobile Web (M5)",
    "Plume for Android",
    "Seesmic",
    "Talon (Classic)",
    "Talon Android",
    "Talon (Plus)",
    "Talon Plus",
    "TW Blue",
    "Tweetbot for iΟS",
    "Tweetbot for Mac",
    "TweetCaster for Android",
    "TweetCaster for iOS",
    "TweetDeck",
    "Tweetings for Android",
    "Tweetings for  Windows",
    "Tweetium for Windows",
    "twicca",
    "Twidere for Android #2",
    "Twidere for Android #3",
    "Twidere for Android #4",
    "Twidere for Android #5",
    "Twidere for Android #7",
    "Twitter",
    "Twitter for Android",
    "Twitter for  Android",
    "Twitter for Android Tablets",
    "Twitter for BlackBerry",
    "Twitter for BlackBerry®",
    "Twitter for iPad",
    "Twitter for iPhone",
    "Twitter for  iPhone",
    "Twitter for Mac",
    "Twitter for Samsung Tablets",
    "Twitter for Windows",
    "Twitter for Windows Phone",
    "Twitter Lite",
    "Twitter Web Client",
    "Twitterrific",
    "Twitterrific for Mac",
    "Twitterrific for iOS",
    "Twittnuker",
    "Wxbooks",
    "YoruFukurou",
];

/// Membership set over client names. Matching is case- and
/// punctuation-sensitive.
#[derive(Debug, Clone)]
pub struct AllowedClients {
    names: HashSet<String>,
}

impl AllowedClients {
    /// The fixed allowlist used by the merge stage.
    pub fn default_set() -> Self {
        Self {
            names: DEFAULT_CLIENTS.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn contains(&self, client: &str) -> bool {
        self.names.contains(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_size() {
        assert_eq!(AllowedClients::default_set().names.len(), DEFAULT_CLIENTS.len());
        assert_eq!(DEFAULT_CLIENTS.len(), 56);
    }

    #[test]
    fn test_exact_match_only() {
        let clients = AllowedClients::default_set();
        assert!(clients.contains("Twitter for iPhone"));
        assert!(clients.contains("Twitter for  iPhone"));
        assert!(!clients.contains("twitter for iphone"));
        assert!(!clients.contains("Twitter for iPhone "));
        assert!(!clients.contains("IFTTT"));
        assert!(!clients.contains(""));
    }

    #[test]
    fn test_greek_omicron_variant() {
        let clients = AllowedClients::default_set();
        assert!(clients.contains("Tweetbot for iΟS"));
        assert!(!clients.contains("Tweetbot for iOS"));
    }
}
