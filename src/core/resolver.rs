/// Symbol resolution: maps a placeholder name to its candidate rules,
/// decoding gender suffixes and French article prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::grammar::{Grammar, GrammarError, GroupRules};

/// Leading characters that trigger elision (`l'`, `de l'`) or `son`.
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'é', 'è', 'ê', 'h'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Masc,
    Fem,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Masc, Gender::Fem];

    /// Tag used in gendered groups and in `_masc` / `_fem` name suffixes.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Masc => "masc",
            Self::Fem => "fem",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Article or possessive wrapped around each candidate of a gendered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pronoun {
    /// `pronomdef_`: le / la / l'
    Definite,
    /// `Pronomdef_`: Le / La / L'
    DefiniteUpper,
    /// `pronomindef_`: un / une
    Indefinite,
    /// `Pronomindef_`: Un / Une
    IndefiniteUpper,
    /// `pronompart_`: du / de la / de l'
    Partitive,
    /// `pronomposs_`: son / sa
    Possessive,
}

impl Pronoun {
    pub const ALL: [Pronoun; 6] = [
        Pronoun::Definite,
        Pronoun::DefiniteUpper,
        Pronoun::Indefinite,
        Pronoun::IndefiniteUpper,
        Pronoun::Partitive,
        Pronoun::Possessive,
    ];

    /// Name prefix selecting this pronoun, without the trailing underscore.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Definite => "pronomdef",
            Self::DefiniteUpper => "Pronomdef",
            Self::Indefinite => "pronomindef",
            Self::IndefiniteUpper => "Pronomindef",
            Self::Partitive => "pronompart",
            Self::Possessive => "pronomposs",
        }
    }

    pub fn apply(&self, gender: Gender, item: &str) -> String {
        let elide = starts_with_vowel(item);
        let masc = gender == Gender::Masc;
        match self {
            Self::Definite if elide => format!("l'{item}"),
            Self::Definite => format!("{} {item}", if masc { "le" } else { "la" }),
            Self::DefiniteUpper if elide => format!("L'{item}"),
            Self::DefiniteUpper => format!("{} {item}", if masc { "Le" } else { "La" }),
            Self::Indefinite => format!("{} {item}", if masc { "un" } else { "une" }),
            Self::IndefiniteUpper => format!("{} {item}", if masc { "Un" } else { "Une" }),
            Self::Partitive if elide => format!("de l'{item}"),
            Self::Partitive => format!("{} {item}", if masc { "du" } else { "de la" }),
            Self::Possessive if elide => format!("son {item}"),
            Self::Possessive => format!("{} {item}", if masc { "son" } else { "sa" }),
        }
    }
}

fn starts_with_vowel(item: &str) -> bool {
    item.chars().next().is_some_and(|c| VOWELS.contains(&c))
}

/// A group name split into its naming conventions:
/// `[<pronoun>_]<base>[_masc|_fem]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolName<'a> {
    pub pronoun: Option<Pronoun>,
    pub base: &'a str,
    pub gender: Option<Gender>,
}

impl<'a> SymbolName<'a> {
    pub fn parse(name: &'a str) -> SymbolName<'a> {
        let mut base = name;

        let pronoun = Pronoun::ALL.into_iter().find(|pronoun| {
            base.strip_prefix(pronoun.prefix())
                .is_some_and(|rest| rest.starts_with('_'))
        });
        if let Some(pronoun) = pronoun {
            base = &base[pronoun.prefix().len() + 1..];
        }

        let gender = Gender::ALL.into_iter().find(|gender| {
            base.strip_suffix(gender.tag())
                .is_some_and(|rest| rest.ends_with('_'))
        });
        if let Some(gender) = gender {
            base = &base[..base.len() - gender.tag().len() - 1];
        }

        SymbolName {
            pronoun,
            base,
            gender,
        }
    }

    /// True when the name uses a gender suffix or a pronoun prefix.
    pub fn is_conventional(&self) -> bool {
        self.pronoun.is_some() || self.gender.is_some()
    }
}

/// Resolves placeholder names against a grammar.
#[derive(Debug, Clone, Copy)]
pub struct SymbolResolver<'g> {
    grammar: &'g Grammar,
}

impl<'g> SymbolResolver<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Candidate rules for `name`.
    ///
    /// A name declared verbatim in the grammar always resolves to that group.
    /// Otherwise `_masc` / `_fem` select from a gendered group (with its `*`
    /// entries appended) and a pronoun prefix wraps each candidate.
    pub fn resolve(&self, name: &str) -> Result<Vec<String>, GrammarError> {
        if let Some(rules) = self.grammar.get(name) {
            return Ok(rules.all_rules());
        }

        let symbol = SymbolName::parse(name);
        let Some(gender) = symbol.gender else {
            return Err(match symbol.pronoun {
                Some(_) => GrammarError::InvalidGroupShape {
                    group: name.to_string(),
                    expected: "a _masc or _fem suffix after the pronoun prefix".to_string(),
                },
                None => GrammarError::UnknownGroup(name.to_string()),
            });
        };

        let rules = self
            .grammar
            .get(symbol.base)
            .ok_or_else(|| GrammarError::UnknownGroup(symbol.base.to_string()))?;
        let GroupRules::Gendered(gendered) = rules else {
            return Err(GrammarError::InvalidGroupShape {
                group: symbol.base.to_string(),
                expected: "a gender mapping".to_string(),
            });
        };
        let candidates = gendered
            .candidates(gender)
            .ok_or_else(|| GrammarError::InvalidGroupShape {
                group: symbol.base.to_string(),
                expected: format!("a [{gender}] entry"),
            })?;

        Ok(match symbol.pronoun {
            Some(pronoun) => candidates
                .iter()
                .map(|item| pronoun.apply(gender, item))
                .collect(),
            None => candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(json: &str) -> Grammar {
        Grammar::parse_json(json).unwrap()
    }

    #[test]
    fn parse_plain_name() {
        let s = SymbolName::parse("animal");
        assert_eq!(s.base, "animal");
        assert!(!s.is_conventional());
    }

    #[test]
    fn parse_prefix_and_suffix() {
        let s = SymbolName::parse("pronompart_food_fem");
        assert_eq!(s.pronoun, Some(Pronoun::Partitive));
        assert_eq!(s.gender, Some(Gender::Fem));
        assert_eq!(s.base, "food");

        let s = SymbolName::parse("Pronomindef_big_animal_masc");
        assert_eq!(s.pronoun, Some(Pronoun::IndefiniteUpper));
        assert_eq!(s.base, "big_animal");
    }

    #[test]
    fn prefix_requires_underscore() {
        let s = SymbolName::parse("pronomdefault");
        assert_eq!(s.pronoun, None);
        assert_eq!(s.base, "pronomdefault");
    }

    #[test]
    fn gendered_resolution_appends_wildcard() {
        let g = grammar(r##"{"greeting": {"masc": ["boy"], "fem": ["girl"], "*": ["kid"]}}"##);
        let r = SymbolResolver::new(&g);
        assert_eq!(r.resolve("greeting_masc").unwrap(), vec!["boy", "kid"]);
        assert_eq!(r.resolve("greeting_fem").unwrap(), vec!["girl", "kid"]);
    }

    #[test]
    fn definite_article_elides_before_vowel() {
        let g = grammar(r##"{"thing": {"masc": ["arbre", "chat"], "fem": ["fleur", "herbe"]}}"##);
        let r = SymbolResolver::new(&g);
        assert_eq!(r.resolve("pronomdef_thing_masc").unwrap(), vec!["l'arbre", "le chat"]);
        assert_eq!(r.resolve("Pronomdef_thing_fem").unwrap(), vec!["La fleur", "L'herbe"]);
    }

    #[test]
    fn indefinite_article_never_elides() {
        let g = grammar(r##"{"thing": {"masc": ["arbre"], "fem": ["fleur", "herbe"]}}"##);
        let r = SymbolResolver::new(&g);
        assert_eq!(r.resolve("pronomindef_thing_fem").unwrap(), vec!["une fleur", "une herbe"]);
        assert_eq!(r.resolve("Pronomindef_thing_masc").unwrap(), vec!["Un arbre"]);
    }

    #[test]
    fn partitive_and_possessive_forms() {
        let g = grammar(r##"{"food": {"masc": ["pain"], "fem": ["soupe", "eau"]}}"##);
        let r = SymbolResolver::new(&g);
        assert_eq!(r.resolve("pronompart_food_masc").unwrap(), vec!["du pain"]);
        assert_eq!(
            r.resolve("pronompart_food_fem").unwrap(),
            vec!["de la soupe", "de l'eau"]
        );
        assert_eq!(r.resolve("pronomposs_food_fem").unwrap(), vec!["sa soupe", "son eau"]);
        assert_eq!(r.resolve("pronomposs_food_masc").unwrap(), vec!["son pain"]);
    }

    #[test]
    fn unknown_base_group() {
        let g = grammar(r##"{"origin": ["x"]}"##);
        let err = SymbolResolver::new(&g).resolve("pronomdef_beast_masc").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownGroup(ref n) if n == "beast"));
        let err = SymbolResolver::new(&g).resolve("beast").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownGroup(ref n) if n == "beast"));
    }

    #[test]
    fn flat_group_with_gender_suffix_is_invalid() {
        let g = grammar(r##"{"color": ["red"]}"##);
        let err = SymbolResolver::new(&g).resolve("color_fem").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidGroupShape { ref group, .. } if group == "color"));
    }

    #[test]
    fn missing_gender_entry_is_invalid() {
        let g = grammar(r##"{"color": {"masc": ["rouge"]}}"##);
        let err = SymbolResolver::new(&g).resolve("color_fem").unwrap_err();
        assert_eq!(
            err.to_string(),
            "group [color] has an invalid shape: expected a [fem] entry"
        );
    }

    #[test]
    fn pronoun_without_gender_is_invalid() {
        let g = grammar(r##"{"color": ["red"]}"##);
        let err = SymbolResolver::new(&g).resolve("pronomdef_color").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidGroupShape { .. }));
    }

    #[test]
    fn declared_name_wins_over_conventions() {
        let g = grammar(r##"{"pronomdef_animal_masc": ["le chat"]}"##);
        let r = SymbolResolver::new(&g);
        assert_eq!(r.resolve("pronomdef_animal_masc").unwrap(), vec!["le chat"]);
    }
}
