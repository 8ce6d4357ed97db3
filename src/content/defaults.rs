use std::collections::BTreeMap;

use serde_json::Value;

use crate::content::types::{Education, Experience, Profile, Project, Testimonial};
use crate::store::keys;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

pub const DEFAULT_PROFILE_IMAGE: &str = "/images/profile-sunset.jpg";

/// Placeholder content served before the operator edits anything. Matches
/// what the fallback store is seeded with, so an empty live store and the
/// fallback render the same site.
pub fn default_profile() -> Profile {
    Profile {
        name: Some("Subash Gautam".into()),
        title: Some("Creative Developer".into()),
        summary: Some(
            "Passionate about creating innovative digital experiences with cutting-edge technologies."
                .into(),
        ),
        image: Some(DEFAULT_PROFILE_IMAGE.into()),
        projects: Some(vec![
            Project {
                id: Some("default-1".into()),
                title: "Portfolio Website".into(),
                description: Some(
                    "A personal portfolio website built with Next.js and Tailwind CSS.".into(),
                ),
                technologies: Some(vec!["Next.js".into(), "React".into(), "Tailwind CSS".into()]),
                link: Some("#".into()),
                pdf_file: Some("https://pdfs.example.com/portfolio-case-study.pdf".into()),
                ..Default::default()
            },
            Project {
                id: Some("default-2".into()),
                title: "E-commerce Platform".into(),
                description: Some(
                    "A full-featured e-commerce platform with product management and checkout."
                        .into(),
                ),
                technologies: Some(vec!["React".into(), "Node.js".into(), "Redis".into()]),
                link: Some("#".into()),
                pdf_file: Some("https://pdfs.example.com/ecommerce-case-study.pdf".into()),
                ..Default::default()
            },
            Project {
                id: Some("default-3".into()),
                title: "Task Management App".into(),
                description: Some("A productivity app for managing tasks and projects.".into()),
                technologies: Some(vec!["React".into(), "Firebase".into(), "Material UI".into()]),
                link: Some("#".into()),
                ..Default::default()
            },
        ]),
        experience: Some(vec![
            Experience {
                id: Some("default-1".into()),
                title: "Senior Frontend Developer".into(),
                company: "Tech Innovators".into(),
                period: "2021 - Present".into(),
                description: "Leading the frontend development team, implementing new features, and optimizing performance.".into(),
                ..Default::default()
            },
            Experience {
                id: Some("default-2".into()),
                title: "Web Developer".into(),
                company: "Digital Solutions".into(),
                period: "2018 - 2021".into(),
                description: "Developed responsive websites and web applications for various clients across different industries.".into(),
                ..Default::default()
            },
            Experience {
                id: Some("default-3".into()),
                title: "Junior Developer".into(),
                company: "StartUp Hub".into(),
                period: "2016 - 2018".into(),
                description: "Assisted in the development of web applications and gained experience in modern web technologies.".into(),
                ..Default::default()
            },
        ]),
        education: Some(vec![
            Education {
                id: Some("default-1".into()),
                degree: "Master's in Computer Science".into(),
                institution: "Tech University".into(),
                period: "2014 - 2016".into(),
                description: "Specialized in web technologies and software engineering with a focus on modern application development.".into(),
                ..Default::default()
            },
            Education {
                id: Some("default-2".into()),
                degree: "Bachelor's in Computer Science".into(),
                institution: "National College".into(),
                period: "2010 - 2014".into(),
                description: "Studied fundamental computer science concepts, algorithms, and programming languages.".into(),
                ..Default::default()
            },
        ]),
        testimonials: Some(vec![
            Testimonial {
                id: Some("default-1".into()),
                name: "Sarah Johnson".into(),
                position: "CEO, TechStart".into(),
                content: "Working with Subash was an absolute pleasure. He delivered our project on time and exceeded our expectations with the quality of his work.".into(),
                avatar: Some("/placeholder.svg?height=100&width=100".into()),
                ..Default::default()
            },
            Testimonial {
                id: Some("default-2".into()),
                name: "Michael Chen".into(),
                position: "Product Manager, InnovateCorp".into(),
                content: "Subash's attention to detail and problem-solving skills are exceptional. He quickly understood our requirements and delivered a solution that perfectly matched our vision.".into(),
                avatar: Some("/placeholder.svg?height=100&width=100".into()),
                ..Default::default()
            },
        ]),
        social_links: Some(BTreeMap::from([
            ("twitter".into(), "https://twitter.com/username".into()),
            ("linkedin".into(), "https://linkedin.com/in/username".into()),
            ("github".into(), "https://github.com/username".into()),
            ("instagram".into(), "https://instagram.com/username".into()),
        ])),
        stats: Some(BTreeMap::from([
            ("projects".into(), "50+".into()),
            ("experience".into(), "5+".into()),
            ("clients".into(), "30+".into()),
            ("awards".into(), "10+".into()),
        ])),
        ..Default::default()
    }
}

/// Key/value pairs used to seed the fallback store and an empty live store.
/// Messages are not seeded; that collection starts empty.
pub fn default_content() -> anyhow::Result<Vec<(&'static str, Value)>> {
    let profile = default_profile();
    Ok(vec![
        (keys::PROJECTS, serde_json::to_value(&profile.projects)?),
        (keys::EXPERIENCES, serde_json::to_value(&profile.experience)?),
        (keys::EDUCATION, serde_json::to_value(&profile.education)?),
        (keys::TESTIMONIALS, serde_json::to_value(&profile.testimonials)?),
        (keys::PROFILE, serde_json::to_value(&profile)?),
    ])
}
