//! Sample shapes and the mapper configured for them.

use anyhow::{Context, Result};
use qmap_engine::{Expr, Mapper};
use qmap_model::{
    Catalog, ConstructorDesc, MemberDesc, ObjectDesc, ObjectValue, Reflect, Ty, Value, ValueError,
    reflect_enum, reflect_object,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    pub name: String,
    pub age: i32,
}

reflect_object!(Animal as "Animal" {
    name: String => "Name",
    age: i32 => "Age",
});

#[derive(Debug, Clone, PartialEq)]
pub struct AnimalDto {
    pub name: String,
    pub age: i32,
}

reflect_object!(AnimalDto as "AnimalDto" {
    name: String => "Name",
    age: i32 => "Age",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub firstname: String,
    pub lastname: String,
    pub age: Option<f64>,
    pub animals: Vec<Option<Animal>>,
}

reflect_object!(Person as "Person" {
    firstname: String => "Firstname",
    lastname: String => "Lastname",
    age: Option<f64> => "Age",
    animals: Vec<Option<Animal>> => "Animals",
});

/// Names are set through `new(Firstname, Lastname)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDto {
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub fullname: String,
    pub animals: Vec<AnimalDto>,
}

impl Reflect for PersonDto {
    fn ty() -> Ty {
        Ty::object("PersonDto")
    }

    fn describe(catalog: &mut Catalog) {
        if catalog.contains("PersonDto") {
            return;
        }
        catalog.insert(
            ObjectDesc::new("PersonDto")
                .member(MemberDesc::read_only("Firstname", Ty::text()))
                .member(MemberDesc::read_only("Lastname", Ty::text()))
                .member(MemberDesc::new("Age", Ty::i32()))
                .member(MemberDesc::new("Fullname", Ty::text()))
                .member(MemberDesc::new("Animals", Vec::<AnimalDto>::ty()))
                .constructor(
                    ConstructorDesc::public("new")
                        .param("Firstname", Ty::text())
                        .param("Lastname", Ty::text()),
                ),
        );
        AnimalDto::describe(catalog);
    }

    fn to_value(&self) -> Value {
        ObjectValue::new("PersonDto")
            .with("Firstname", self.firstname.as_str())
            .with("Lastname", self.lastname.as_str())
            .with("Age", self.age)
            .with("Fullname", self.fullname.as_str())
            .with("Animals", self.animals.to_value())
            .into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut obj = value.into_object()?;
        Ok(Self {
            firstname: obj.take("Firstname")?,
            lastname: obj.take("Lastname")?,
            age: obj.take("Age")?,
            fullname: obj.take("Fullname")?,
            animals: obj.take("Animals")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Unknown,
    Novel,
    Poetry,
    Essay,
}

reflect_enum!(Genre as "Genre" { Unknown = 0, Novel = 1, Poetry = 2, Essay = 3 });

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

reflect_object!(Author as "Author" {
    first_name: String => "FirstName",
    last_name: String => "LastName",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: Option<Author>,
    pub genre: Genre,
    pub tags: Vec<String>,
}

reflect_object!(Book as "Book" {
    title: String => "Title",
    author: Option<Author> => "Author",
    genre: Genre => "Genre",
    tags: Vec<String> => "Tags",
});

#[derive(Debug, Clone, PartialEq)]
pub struct ReadBookResponse {
    pub title: String,
    pub author_name: String,
    pub genre: String,
    pub tags: Box<[String]>,
}

reflect_object!(ReadBookResponse as "ReadBookResponse" {
    title: String => "Title",
    author_name: String => "AuthorName",
    genre: String => "Genre",
    tags: Box<[String]> => "Tags",
});

fn concat_names(first: &str, last: &str) -> Expr {
    Expr::source()
        .member(first)
        .concat(" ")
        .concat(Expr::source().member(last))
}

/// Mapper with the sample pairs configured.
///
/// # Errors
///
/// Fails if a sample configuration no longer validates.
pub fn mapper() -> Result<Mapper> {
    let mut builder = Mapper::builder();
    builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Fullname", concat_names("Firstname", "Lastname"))?
                .using_constructor(Expr::construct(
                    "PersonDto",
                    "new",
                    vec![
                        Expr::source().member("Firstname"),
                        Expr::source().member("Lastname"),
                    ],
                ))?;
            Ok(())
        })
        .context("configure Person -> PersonDto")?
        .configure::<Book, ReadBookResponse, _>(|m| {
            m.match_member(
                "AuthorName",
                Expr::source()
                    .member("Author")
                    .member("FirstName")
                    .concat(" ")
                    .concat(Expr::source().member("Author").member("LastName")),
            )?;
            Ok(())
        })
        .context("configure Book -> ReadBookResponse")?;
    Ok(builder.build())
}

pub fn people() -> Vec<Person> {
    vec![
        Person {
            firstname: "Mert".into(),
            lastname: "Baykar".into(),
            age: Some(26.3),
            animals: vec![
                Some(Animal {
                    name: "Pamuk".into(),
                    age: 0,
                }),
                None,
            ],
        },
        Person {
            firstname: "Ayse".into(),
            lastname: "Kaya".into(),
            age: None,
            animals: vec![Some(Animal {
                name: "Duman".into(),
                age: 7,
            })],
        },
    ]
}

pub fn books() -> Vec<Book> {
    vec![
        Book {
            title: "Tutunamayanlar".into(),
            author: Some(Author {
                first_name: "Oguz".into(),
                last_name: "Atay".into(),
            }),
            genre: Genre::Novel,
            tags: vec!["classic".into(), "modernist".into()],
        },
        Book {
            title: "Anonymous Verses".into(),
            author: None,
            genre: Genre::Poetry,
            tags: Vec::new(),
        },
    ]
}
