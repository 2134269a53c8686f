//! Demo content for a fresh database. Each collection is only seeded while it is empty.
//!
//! Demo rows carry no image; views skip the picture when `image` is empty.

use tracing::info;

use blog_common::error::CommonError;
use blog_common::model::{NewCategory, NewRecipe};
use blog_common::store::BlogStore;

const DEMO_EMAIL: &str = "hello@email.com";

const CATEGORIES: &[&str] = &["Thai", "American", "Chinese", "Mexican", "Indian", "Spanish"];

struct DemoRecipe {
    name: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    category: &'static str,
}

const RECIPES: &[DemoRecipe] = &[
    DemoRecipe {
        name: "Crab cakes",
        description: "Mix the crabmeat with the mashed potato, spring onions and parsley, shape into cakes and fry until golden.",
        ingredients: &["3 spring onions", "½ a bunch of fresh flat-leaf parsley", "1 large free-range egg", "750 g cooked crabmeat", "300 g mashed potatoes"],
        category: "American",
    },
    DemoRecipe {
        name: "Thai-style mussels",
        description: "Wash the mussels thoroughly, discarding any that aren’t tightly closed, then steam them with garlic and coriander.",
        ingredients: &["1 kg mussels , debearded, from sustainable sources", "groundnut oil", "4 spring onions", "2 cloves of garlic", "½ a bunch of fresh coriander"],
        category: "Thai",
    },
    DemoRecipe {
        name: "Thai-Chinese-inspired pinch salad",
        description: "Peel and very finely chop the ginger and deseed and finely slice the chilli, then toss with the prawns.",
        ingredients: &["5 cm piece of ginger", "1 fresh red chilli", "25 g sesame seeds", "24 raw peeled king prawns", "1 pinch Chinese five-spice powder"],
        category: "Chinese",
    },
    DemoRecipe {
        name: "Southern fried chicken",
        description: "To make the brine, toast the peppercorns in a large pan on a high heat for 1 minute, then soak the chicken overnight.",
        ingredients: &["4 free-range chicken thighs , skin on, bone in", "4 free-range chicken drumsticks", "200 ml buttermilk", "4 sweet potatoes", "200 g plain flour"],
        category: "American",
    },
    DemoRecipe {
        name: "Chocolate & banoffee whoopie pies",
        description: "Preheat the oven to 170ºC/325ºF/gas 3 and line 2 baking sheets with greaseproof paper.",
        ingredients: &["2 heaped tablespoons cocoa powder", "350 g self-raising flour", "175 g sugar", "200 ml milk", "2 bananas"],
        category: "American",
    },
    DemoRecipe {
        name: "Veggie pad Thai",
        description: "Cook the noodles according to the packet instructions, then drain and refresh under cold running water.",
        ingredients: &["150 g rice noodles", "sesame oil", "2 cloves of garlic", "80 g silken tofu", "low-salt soy sauce"],
        category: "Thai",
    },
    DemoRecipe {
        name: "Chinese steak & tofu stew",
        description: "Get your prep done first, for smooth cooking. Chop the steak into 1cm chunks.",
        ingredients: &["250g rump or sirloin steak", "2 cloves of garlic", "4cm piece of ginger", "2 fresh red chilli", "1 bunch of spring onions"],
        category: "Chinese",
    },
    DemoRecipe {
        name: "Spring rolls",
        description: "Put your mushrooms in a medium-sized bowl, cover with hot water and leave for 10 minutes.",
        ingredients: &["40 g dried Asian mushrooms", "50 g vermicelli noodles", "200 g Chinese cabbage", "1 carrot", "3 spring onions"],
        category: "Chinese",
    },
    DemoRecipe {
        name: "Tom Daley's sweet & sour chicken",
        description: "Drain the juices from the tinned fruit into a bowl, add the soy and fish sauces and fry the chicken.",
        ingredients: &["1 x 227 g tin of pineapple in natural juice", "1 x 213 g tin of peaches in natural juice", "1 tablespoon low-salt soy sauce", "1 tablespoon fish sauce", "2 teaspoons cornflour"],
        category: "Chinese",
    },
    DemoRecipe {
        name: "Key lime pie",
        description: "Preheat the oven to 175ºC/gas 3. Lightly grease a 22cm metal or glass pie dish with a little of the butter.",
        ingredients: &["4 large free-range egg yolks", "400 ml condensed milk", "5 limes", "200 ml double cream"],
        category: "American",
    },
    DemoRecipe {
        name: "Stir-fried vegetables",
        description: "Crush the garlic and finely slice the chilli and spring onion.",
        ingredients: &["1 clove of garlic", "1 fresh red chilli", "3 spring onions", "1 small red onion", "1 handful of mangetout"],
        category: "Chinese",
    },
];

/// Insert the demo categories and recipes into whichever collections are still empty.
pub async fn seed_if_empty(store: &BlogStore) -> Result<(), CommonError> {
    if store.count_categories().await? == 0 {
        let categories = CATEGORIES
            .iter()
            .map(|name| NewCategory {
                name: name.to_string(),
                image: String::new(),
            })
            .collect();
        let inserted = store.insert_categories(categories).await?;
        info!(inserted, "demo categories inserted");
    } else {
        info!("categories already exist, skipping demo categories");
    }

    if store.count_recipes().await? == 0 {
        let recipes = RECIPES
            .iter()
            .map(|r| NewRecipe {
                name: r.name.to_string(),
                description: r.description.to_string(),
                email: DEMO_EMAIL.to_string(),
                ingredients: r.ingredients.iter().map(|i| i.to_string()).collect(),
                category: r.category.to_string(),
                image: String::new(),
            })
            .collect();
        let inserted = store.insert_recipes(recipes).await?;
        info!(inserted, "demo recipes inserted");
    } else {
        info!("recipes already exist, skipping demo recipes");
    }

    Ok(())
}
