#![allow(dead_code)]

use qmap_engine::model::{
    Catalog, ConstructorDesc, Lazy, MemberDesc, ObjectDesc, Reflect, Ty, Value, ValueError,
    reflect_enum, reflect_object,
};
use qmap_engine::{Expr, Mapper, MapperBuilder};

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

#[derive(Debug, Clone, PartialEq)]
pub struct PersonDto {
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub fullname: String,
    pub animals: Vec<AnimalDto>,
}

reflect_object!(PersonDto as "PersonDto" {
    firstname: String => "Firstname",
    lastname: String => "Lastname",
    age: i32 => "Age",
    fullname: String => "Fullname",
    animals: Vec<AnimalDto> => "Animals",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Stray {
    pub name: String,
    pub age: String,
}

reflect_object!(Stray as "Stray" {
    name: String => "Name",
    age: String => "Age",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Shelter {
    pub strays: Vec<Option<Stray>>,
}

reflect_object!(Shelter as "Shelter" {
    strays: Vec<Option<Stray>> => "Strays",
});

#[derive(Debug, Clone)]
pub struct ShelterView {
    pub strays: Lazy<AnimalDto>,
}

reflect_object!(ShelterView as "ShelterView" {
    strays: Lazy<AnimalDto> => "Strays",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Kennel {
    pub animals: Option<Vec<Animal>>,
}

reflect_object!(Kennel as "Kennel" {
    animals: Option<Vec<Animal>> => "Animals",
});

#[derive(Debug, Clone, PartialEq)]
pub struct KennelList {
    pub animals: Vec<AnimalDto>,
}

reflect_object!(KennelList as "KennelList" {
    animals: Vec<AnimalDto> => "Animals",
});

#[derive(Debug, Clone, PartialEq)]
pub struct KennelArray {
    pub animals: Box<[AnimalDto]>,
}

reflect_object!(KennelArray as "KennelArray" {
    animals: Box<[AnimalDto]> => "Animals",
});

#[derive(Debug, Clone)]
pub struct KennelView {
    pub animals: Lazy<AnimalDto>,
}

reflect_object!(KennelView as "KennelView" {
    animals: Lazy<AnimalDto> => "Animals",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Unknown,
    Novel,
    Poetry,
}

reflect_enum!(Genre as "Genre" { Unknown = 0, Novel = 1, Poetry = 2 });

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
    pub pages: i32,
}

reflect_object!(Book as "Book" {
    title: String => "Title",
    author: Option<Author> => "Author",
    genre: Genre => "Genre",
    pages: i32 => "Pages",
});

/// Title is only settable through the constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    pub title: String,
    pub author_name: String,
    pub genre: String,
    pub pages: i64,
}

impl Reflect for BookSummary {
    fn ty() -> Ty {
        Ty::object("BookSummary")
    }

    fn describe(catalog: &mut Catalog) {
        if catalog.contains("BookSummary") {
            return;
        }
        catalog.insert(
            ObjectDesc::new("BookSummary")
                .member(MemberDesc::read_only("Title", Ty::text()))
                .member(MemberDesc::new("AuthorName", Ty::text()))
                .member(MemberDesc::new("Genre", Ty::text()))
                .member(MemberDesc::new("Pages", Ty::i64()))
                .constructor(ConstructorDesc::public("new").param("title", Ty::text())),
        );
    }

    fn to_value(&self) -> Value {
        qmap_engine::model::ObjectValue::new("BookSummary")
            .with("Title", self.title.as_str())
            .with("AuthorName", self.author_name.as_str())
            .with("Genre", self.genre.as_str())
            .with("Pages", self.pages)
            .into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut obj = value.into_object()?;
        Ok(Self {
            title: obj.take("Title")?,
            author_name: obj.take("AuthorName")?,
            genre: obj.take("Genre")?,
            pages: obj.take("Pages")?,
        })
    }
}

/// Shape whose only constructor wants a value the source does not carry.
pub fn read_book_response() -> ObjectDesc {
    ObjectDesc::new("ReadBookResponse")
        .member(MemberDesc::read_only("Title", Ty::text()))
        .member(MemberDesc::read_only("AuthorName", Ty::text()))
        .constructor(
            ConstructorDesc::public("new")
                .param("Title", Ty::text())
                .param("AuthorName", Ty::text()),
        )
}

/// Read-only names set through an explicit constructor.
pub fn contact_card() -> ObjectDesc {
    ObjectDesc::new("ContactCard")
        .member(MemberDesc::read_only("Firstname", Ty::text()))
        .member(MemberDesc::read_only("Lastname", Ty::text()))
        .member(MemberDesc::new("Fullname", Ty::text()))
        .constructor(
            ConstructorDesc::public("new")
                .param("Firstname", Ty::text())
                .param("Lastname", Ty::text()),
        )
}

/// Two `new` overloads; only constructors set the names.
pub fn badge() -> ObjectDesc {
    ObjectDesc::new("Badge")
        .member(MemberDesc::read_only("Firstname", Ty::text()))
        .member(MemberDesc::read_only("Lastname", Ty::text()))
        .constructor(ConstructorDesc::public("new").param("Firstname", Ty::text()))
        .constructor(
            ConstructorDesc::public("new")
                .param("Firstname", Ty::text())
                .param("Lastname", Ty::text()),
        )
}

pub fn fullname() -> Expr {
    Expr::source()
        .member("Firstname")
        .concat(" ")
        .concat(Expr::source().member("Lastname"))
}

pub fn person_builder() -> MapperBuilder {
    let mut builder = Mapper::builder();
    builder
        .configure::<Person, PersonDto, _>(|m| {
            m.match_member("Fullname", fullname())?;
            Ok(())
        })
        .expect("person mapping configures");
    builder
}

pub fn person_mapper() -> Mapper {
    person_builder().build()
}

pub fn mert() -> Person {
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
    }
}
