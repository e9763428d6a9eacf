//! Panel bodies. Buttons carrying `data-open-window` ask the desktop to open
//! (or refocus) another panel.

use maud::{html, Markup};

struct Milestone {
    year: &'static str,
    title: &'static str,
    detail: &'static str,
}

struct Skill {
    name: &'static str,
    level: u8,
}

struct Project {
    title: &'static str,
    description: &'static str,
    source: &'static str,
}

const MILESTONES: &[Milestone] = &[
    Milestone {
        year: "2025",
        title: "Technical Support Engineer",
        detail: "Transitioning to cloud technologies and automation",
    },
    Milestone {
        year: "2024",
        title: "IT Help Desk Technician",
        detail: "First professional foray into supporting complex systems",
    },
    Milestone {
        year: "2019",
        title: "Studying Psychology",
        detail: "Started academic journey at Florida State University",
    },
];

const SKILLS: &[(&str, &[Skill])] = &[
    (
        "System Administration",
        &[
            Skill { name: "Active Directory", level: 90 },
            Skill { name: "NinjaRMM", level: 90 },
            Skill { name: "Microsoft Intune", level: 85 },
            Skill { name: "Linux Administration", level: 85 },
            Skill { name: "Defender for Endpoint", level: 70 },
        ],
    ),
    (
        "Languages & Frameworks",
        &[
            Skill { name: "HTML/CSS", level: 70 },
            Skill { name: "Python", level: 40 },
            Skill { name: "Next.js", level: 40 },
            Skill { name: "LUA", level: 35 },
            Skill { name: "Bash", level: 35 },
        ],
    ),
];

const PROJECTS: &[Project] = &[
    Project {
        title: "Homelab",
        description: "My mini server stack consisting of 2 Proxmox servers, a small Unifi stack, \
                      and a custom built NAS. Current services: Plex, NextCloud, game servers, and more.",
        source: "https://github.com/ryanburkii/homelab",
    },
    Project {
        title: "Portfolio Website",
        description: "This website! I plan to expand this experience with more information about \
                      my projects and to showcase any future rabbit holes I fall down.",
        source: "https://github.com/ryanburkii/myportfolio",
    },
    Project {
        title: "LatiArch",
        description: "My custom Arch Linux & Hyprland setup. This project is forked from Omarchy, \
                      however I plan to add my own set of features.",
        source: "https://github.com/ryanburkii/latiarch",
    },
];

pub fn welcome() -> Markup {
    html! {
        section class="panel-welcome" {
            h1 { "Ryan Berke" }
            p class="lead" { "IT Professional and Aspiring Cloud Engineer" }
            p {
                "I am a dedicated IT professional with a passion for technology and I am always \
                 looking to learn new things. Currently, my main focus is on cloud infrastructure \
                 and cloud security."
            }
            div class="actions" {
                button type="button" data-open-window="projects" { "View Projects" }
                button type="button" data-open-window="contact" { "Get in Touch" }
            }
            ol class="timeline" {
                @for milestone in MILESTONES {
                    li {
                        span class="year" { (milestone.year) }
                        strong { (milestone.title) }
                        p { (milestone.detail) }
                    }
                }
            }
        }
    }
}

pub fn skills() -> Markup {
    html! {
        section class="panel-skills" {
            @for (category, skills) in SKILLS {
                div class="skill-group" {
                    h3 { (category) }
                    ul {
                        @for skill in skills.iter() {
                            li {
                                span { (skill.name) }
                                meter min="0" max="100" value=(skill.level) { (skill.level) "%" }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn projects() -> Markup {
    html! {
        section class="panel-projects" {
            @for project in PROJECTS {
                article class="project" {
                    h3 { (project.title) }
                    p { (project.description) }
                    a href=(project.source) target="_blank" rel="noreferrer" { "View Source" }
                }
            }
        }
    }
}

pub fn contact() -> Markup {
    html! {
        section class="panel-contact" {
            form method="post" action="/api/send-email" data-contact-form {
                label for="name" { "Name" }
                input id="name" name="name" type="text" required placeholder="Your name";
                label for="email" { "Email" }
                input id="email" name="email" type="email" required placeholder="your.email@example.com";
                label for="subject" { "Subject" }
                input id="subject" name="subject" type="text" required placeholder="What is this about?";
                label for="message" { "Message" }
                textarea id="message" name="message" rows="5" required
                    placeholder="Tell me about your project or just say hello!" {}
                button type="submit" { "Send Message" }
                p class="form-status" data-form-status role="status" {}
            }
            aside class="contact-info" {
                p { "Email " a href="mailto:ryan@rjb.rip" { "ryan@rjb.rip" } }
                p { "Location Tampa, FL" }
                a href="https://github.com/ryanburkii" target="_blank" rel="noopener noreferrer" { "GitHub" }
                a href="https://www.linkedin.com/in/ryan-berke-b093152a7/" target="_blank" rel="noopener noreferrer" { "LinkedIn" }
            }
        }
    }
}
