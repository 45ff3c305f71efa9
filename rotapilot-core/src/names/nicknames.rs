//! Nickname equivalence table.
//!
//! Maps common short forms onto one canonical formal name so that "Rob"
//! on the rota matches "Robert Smith" in the portal. Keys are already
//! normalized (lowercase, no titles or punctuation). A name with no
//! entry canonicalizes to itself.

/// Resolve a normalized name to its canonical formal form.
pub fn canonical(name: &str) -> &str {
    match name {
        "rob" | "bob" | "bobby" | "robbie" => "robert",
        "rick" | "dick" | "richie" => "richard",
        "will" | "bill" | "billy" => "william",
        "jim" | "jimmy" | "jamie" => "james",
        "johnny" | "jon" => "john",
        "mike" | "mikey" | "mick" => "michael",
        "tom" | "tommy" => "thomas",
        "joe" | "joey" => "joseph",
        "dan" | "danny" => "daniel",
        "matt" | "matty" => "matthew",
        "dave" | "davey" => "david",
        "nick" | "nicky" => "nicholas",
        "tony" => "anthony",
        "andy" | "drew" => "andrew",
        "steve" | "stephen" => "steven",
        "ed" | "eddie" | "ted" => "edward",
        "charlie" | "chuck" => "charles",
        "ben" | "benji" => "benjamin",
        "alex" => "alexander",
        "vicky" | "vicki" => "victoria",
        "liz" | "beth" | "lizzie" | "eliza" => "elizabeth",
        "cathy" | "katherine" | "kate" | "katie" | "cat" => "catherine",
        "jen" | "jenny" => "jennifer",
        "maggie" | "meg" | "peggy" => "margaret",
        "becky" => "rebecca",
        "steph" => "stephanie",
        "debbie" | "deb" => "deborah",
        "jess" | "jessie" => "jessica",
        "sue" | "suzie" => "susan",
        "barb" => "barbara",
        "kim" => "kimberly",
        "mandy" => "amanda",
        "patty" | "pat" => "patricia",
        "nikki" => "nicole",
        "chris" | "christy" => "christine",
        "sam" => "samantha",
        "shelly" => "michelle",
        "angie" => "angela",
        "mel" | "missy" => "melissa",
        "izzy" => "isabelle",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_nicknames() {
        assert_eq!(canonical("rob"), "robert");
        assert_eq!(canonical("bobby"), "robert");
        assert_eq!(canonical("liz"), "elizabeth");
        assert_eq!(canonical("ted"), "edward");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(canonical("robert"), "robert");
        assert_eq!(canonical("zelda"), "zelda");
        assert_eq!(canonical(""), "");
    }
}
